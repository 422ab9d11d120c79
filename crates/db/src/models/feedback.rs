//! Course feedback (rating + comment) model and DTOs.

use coursely_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A feedback row from the `feedbacks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: DbId,
    pub course_id: DbId,
    pub user_id: DbId,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Average rating and number of ratings for a course.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct RatingSummary {
    pub rating_avg: Option<f64>,
    pub rating_count: i64,
}

/// DTO for leaving (or replacing) feedback on a course.
#[derive(Debug, Deserialize)]
pub struct UpsertFeedback {
    pub rating: i16,
    pub comment: Option<String>,
}
