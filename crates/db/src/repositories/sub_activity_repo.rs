//! Repository for the `sub_activities` table (lessons).

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{CreateSubActivity, SubActivity, UpdateSubActivity};

const COLUMNS: &str = "id, activity_id, title, video_url, content, position, duration_secs, \
                       created_at, updated_at";

/// Same columns qualified with the `s` alias, for joins against `activities a`.
const JOINED_COLUMNS: &str = "s.id, s.activity_id, s.title, s.video_url, s.content, s.position, \
                              s.duration_secs, s.created_at, s.updated_at";

pub struct SubActivityRepo;

impl SubActivityRepo {
    /// Insert a lesson. Without an explicit position it goes last.
    pub async fn create(
        pool: &PgPool,
        activity_id: DbId,
        input: &CreateSubActivity,
    ) -> Result<SubActivity, sqlx::Error> {
        let query = format!(
            "INSERT INTO sub_activities (activity_id, title, video_url, content, position, duration_secs)
             VALUES ($1, $2, $3, $4, COALESCE($5,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM sub_activities WHERE activity_id = $1)), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubActivity>(&query)
            .bind(activity_id)
            .bind(input.title.trim())
            .bind(&input.video_url)
            .bind(&input.content)
            .bind(input.position)
            .bind(input.duration_secs)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SubActivity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sub_activities WHERE id = $1");
        sqlx::query_as::<_, SubActivity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every lesson of a course in course order: sections by position, then
    /// lessons by position within each section.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<SubActivity>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM sub_activities s
             JOIN activities a ON a.id = s.activity_id
             WHERE a.course_id = $1
             ORDER BY a.position, a.id, s.position, s.id"
        );
        sqlx::query_as::<_, SubActivity>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Lesson ids of a course in course order.
    pub async fn ordered_ids_for_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT s.id
             FROM sub_activities s
             JOIN activities a ON a.id = s.activity_id
             WHERE a.course_id = $1
             ORDER BY a.position, a.id, s.position, s.id",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Course a lesson belongs to.
    pub async fn course_id_of(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT a.course_id
             FROM sub_activities s
             JOIN activities a ON a.id = s.activity_id
             WHERE s.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubActivity,
    ) -> Result<Option<SubActivity>, sqlx::Error> {
        let query = format!(
            "UPDATE sub_activities SET
                title = COALESCE($2, title),
                video_url = COALESCE($3, video_url),
                content = COALESCE($4, content),
                position = COALESCE($5, position),
                duration_secs = COALESCE($6, duration_secs)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubActivity>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.video_url)
            .bind(&input.content)
            .bind(input.position)
            .bind(input.duration_secs)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sub_activities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
