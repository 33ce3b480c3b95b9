//! Command implementations.

pub mod account;
pub mod catalog;
pub mod seed;
pub mod stock;
