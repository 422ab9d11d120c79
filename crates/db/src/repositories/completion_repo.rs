//! Repository for the `completions` table.

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::completion::Completion;

const COLUMNS: &str = "id, user_id, sub_activity_id, completed_at, created_at, updated_at";

pub struct CompletionRepo;

impl CompletionRepo {
    /// Mark a lesson complete. Returns `true` on the first completion and
    /// `false` when it was already recorded.
    pub async fn mark_complete(
        pool: &PgPool,
        user_id: DbId,
        sub_activity_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO completions (user_id, sub_activity_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_completions_user_sub_activity DO NOTHING",
        )
        .bind(user_id)
        .bind(sub_activity_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The user's completion of one lesson, if recorded.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        sub_activity_id: DbId,
    ) -> Result<Option<Completion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM completions WHERE user_id = $1 AND sub_activity_id = $2"
        );
        sqlx::query_as::<_, Completion>(&query)
            .bind(user_id)
            .bind(sub_activity_id)
            .fetch_optional(pool)
            .await
    }

    /// Ids of the lessons of `course_id` the user has completed.
    pub async fn completed_ids_for_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT c.sub_activity_id
             FROM completions c
             JOIN sub_activities s ON s.id = c.sub_activity_id
             JOIN activities a ON a.id = s.activity_id
             WHERE c.user_id = $1 AND a.course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
