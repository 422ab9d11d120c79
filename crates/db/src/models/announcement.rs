//! Announcement model and DTOs.

use coursely_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An announcement row. `course_id = None` means platform-wide.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Announcement {
    pub id: DbId,
    pub course_id: Option<DbId>,
    pub author_id: DbId,
    pub title: String,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncement {
    pub course_id: Option<DbId>,
    pub title: String,
    pub body: String,
}

/// `?course_id=` filter; platform-wide announcements are always included.
#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementQuery {
    pub course_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
