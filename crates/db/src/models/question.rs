//! Lesson Q&A: student questions and instructor responses.

use coursely_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A question row from the `video_questions` table, with its author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoQuestion {
    pub id: DbId,
    pub sub_activity_id: DbId,
    pub user_id: DbId,
    pub author_name: String,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A response row from the `video_responses` table, with its author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoResponse {
    pub id: DbId,
    pub question_id: DbId,
    pub user_id: DbId,
    pub author_name: String,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A question as seen in the instructor inbox.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InboxQuestion {
    pub id: DbId,
    pub sub_activity_id: DbId,
    pub lesson_title: String,
    pub course_id: DbId,
    pub course_title: String,
    pub user_id: DbId,
    pub author_name: String,
    pub body: String,
    pub response_count: i64,
    pub created_at: Timestamp,
}

/// Body for posting a question or a response.
#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub body: String,
}

/// Instructor inbox filters.
#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unanswered_only: bool,
    pub course_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
