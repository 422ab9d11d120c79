//! Role lookup rows.

use coursely_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A seeded role and how many active accounts hold it. Feeds the role
/// picker on the manager's user screen.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleSummary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub active_users: i64,
}
