//! One-time Telegram link codes.

use coursely_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct TelegramLinkCode {
    pub id: DbId,
    pub user_id: DbId,
    /// SHA-256 of the code handed to the user.
    pub code_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
