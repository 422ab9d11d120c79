//! Course entity model and DTOs.

use coursely_core::types::{DbId, MinorUnits, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub instructor_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_etb: MinorUnits,
    pub price_usd: MinorUnits,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
}

/// Catalogue entry shown to guests: course plus instructor name and rating.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseCard {
    pub id: DbId,
    pub instructor_id: DbId,
    pub instructor_name: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_etb: MinorUnits,
    pub price_usd: MinorUnits,
    pub rating_avg: Option<f64>,
    pub rating_count: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a course. The instructor comes from the caller's token.
#[derive(Debug, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub price_etb: MinorUnits,
    #[serde(default)]
    pub price_usd: MinorUnits,
    pub is_published: Option<bool>,
}

/// DTO for updating a course. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_etb: Option<MinorUnits>,
    pub price_usd: Option<MinorUnits>,
    pub is_published: Option<bool>,
}

/// Catalogue query parameters (`?search=&limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct CourseListQuery {
    pub search: Option<String>,
    pub instructor_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
