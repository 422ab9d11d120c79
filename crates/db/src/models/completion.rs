//! Lesson completion model.

use coursely_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A completion row from the `completions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Completion {
    pub id: DbId,
    pub user_id: DbId,
    pub sub_activity_id: DbId,
    pub completed_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
