//! Repository for the `announcements` table.

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::announcement::{Announcement, CreateAnnouncement};

const COLUMNS: &str = "id, course_id, author_id, title, body, created_at, updated_at";

pub struct AnnouncementRepo;

impl AnnouncementRepo {
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreateAnnouncement,
    ) -> Result<Announcement, sqlx::Error> {
        let query = format!(
            "INSERT INTO announcements (course_id, author_id, title, body)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Announcement>(&query)
            .bind(input.course_id)
            .bind(author_id)
            .bind(input.title.trim())
            .bind(input.body.trim())
            .fetch_one(pool)
            .await
    }

    /// Platform-wide announcements plus those for `course_id`, newest first.
    pub async fn list(
        pool: &PgPool,
        course_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Announcement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM announcements
             WHERE course_id IS NULL OR course_id = $1::BIGINT
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Announcement>(&query)
            .bind(course_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
