//! Domain error shared by every crate. The API layer maps each variant to
//! exactly one HTTP status.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No `entity` row with this id, or one the caller may not see.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: DbId },

    #[error("invalid input: {0}")]
    Validation(String),

    /// The request is well formed but clashes with current state, e.g. buying
    /// an owned course or refunding an unpaid order.
    #[error("conflicting state: {0}")]
    Conflict(String),

    #[error("not authenticated: {0}")]
    Unauthorized(String),

    #[error("not allowed: {0}")]
    Forbidden(String),

    /// Too many failed logins; sign-in reopens after `minutes`.
    #[error("account locked for {minutes} more minute(s)")]
    Locked { minutes: i64 },
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}
