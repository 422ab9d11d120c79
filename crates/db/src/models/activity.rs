//! Course sections (`activities`) and lessons (`sub_activities`).

use coursely_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A section row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a section. Omitting `position` appends it to the course.
#[derive(Debug, Deserialize)]
pub struct CreateActivity {
    pub title: String,
    pub position: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateActivity {
    pub title: Option<String>,
    pub position: Option<i32>,
}

/// A lesson row from the `sub_activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubActivity {
    pub id: DbId,
    pub activity_id: DbId,
    pub title: String,
    pub video_url: Option<String>,
    pub content: Option<String>,
    pub position: i32,
    pub duration_secs: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a lesson. Omitting `position` appends it to the section.
#[derive(Debug, Deserialize)]
pub struct CreateSubActivity {
    pub title: String,
    pub video_url: Option<String>,
    pub content: Option<String>,
    pub position: Option<i32>,
    pub duration_secs: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSubActivity {
    pub title: Option<String>,
    pub video_url: Option<String>,
    pub content: Option<String>,
    pub position: Option<i32>,
    pub duration_secs: Option<i32>,
}
