//! Repository for the `activities` table (course sections).

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{Activity, CreateActivity, UpdateActivity};

const COLUMNS: &str = "id, course_id, title, position, created_at, updated_at";

pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a section. Without an explicit position it goes last.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateActivity,
    ) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities (course_id, title, position)
             VALUES ($1, $2, COALESCE($3,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM activities WHERE course_id = $1)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(course_id)
            .bind(input.title.trim())
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Sections of a course in display order.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities WHERE course_id = $1 ORDER BY position, id"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateActivity,
    ) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!(
            "UPDATE activities SET
                title = COALESCE($2, title),
                position = COALESCE($3, position)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    /// Delete a section and, by cascade, its lessons.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
