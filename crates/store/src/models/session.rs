//! Session-related types.
//!
//! One session record per process (the "browser tab"), stored in the
//! session-scoped store under [`keys::SESSION`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrine_core::{Role, SessionId, UserId};

/// The active session record.
///
/// Validity is never stored — it is derived lazily from
/// `last_activity_at` against the configured inactivity timeout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// The authenticated user.
    pub user_id: UserId,
    /// Role snapshot taken at login.
    pub role: Role,
    /// Opaque random identifier for this session.
    pub session_id: SessionId,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last reported user activity; refreshed by `touch`.
    pub last_activity_at: DateTime<Utc>,
}

/// Storage keys for session data.
pub mod keys {
    /// Key for the singleton session record.
    pub const SESSION: &str = "session";
}
