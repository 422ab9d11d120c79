//! Repository for the `feedbacks` table.

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::feedback::{Feedback, RatingSummary, UpsertFeedback};

const COLUMNS: &str = "id, course_id, user_id, rating, comment, created_at, updated_at";

pub struct FeedbackRepo;

impl FeedbackRepo {
    /// Leave feedback on a course, replacing the user's earlier feedback.
    pub async fn upsert(
        pool: &PgPool,
        course_id: DbId,
        user_id: DbId,
        input: &UpsertFeedback,
    ) -> Result<Feedback, sqlx::Error> {
        let query = format!(
            "INSERT INTO feedbacks (course_id, user_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_feedbacks_course_user DO UPDATE
             SET rating = EXCLUDED.rating, comment = EXCLUDED.comment
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(course_id)
            .bind(user_id)
            .bind(input.rating)
            .bind(&input.comment)
            .fetch_one(pool)
            .await
    }

    /// Feedback for a course, newest first.
    pub async fn list_for_course(
        pool: &PgPool,
        course_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Feedback>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM feedbacks WHERE course_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(course_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn summary(pool: &PgPool, course_id: DbId) -> Result<RatingSummary, sqlx::Error> {
        sqlx::query_as::<_, RatingSummary>(
            "SELECT AVG(rating)::FLOAT8 AS rating_avg, COUNT(*) AS rating_count
             FROM feedbacks WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await
    }
}
