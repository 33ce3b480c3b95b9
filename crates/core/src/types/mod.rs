//! Core type definitions.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod role;
