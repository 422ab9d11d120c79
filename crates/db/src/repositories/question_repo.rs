//! Repository for lesson Q&A (`video_questions` and `video_responses`).

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::question::{InboxQuery, InboxQuestion, VideoQuestion, VideoResponse};

/// Question columns with the author's name; expects aliases `q` and `u`.
const QUESTION_COLUMNS: &str =
    "q.id, q.sub_activity_id, q.user_id, u.full_name AS author_name, q.body, q.created_at, q.updated_at";

/// Response columns with the author's name; expects aliases `r` and `u`.
const RESPONSE_COLUMNS: &str =
    "r.id, r.question_id, r.user_id, u.full_name AS author_name, r.body, r.created_at, r.updated_at";

pub struct QuestionRepo;

impl QuestionRepo {
    /// Post a question on a lesson.
    pub async fn create_question(
        pool: &PgPool,
        sub_activity_id: DbId,
        user_id: DbId,
        body: &str,
    ) -> Result<VideoQuestion, sqlx::Error> {
        let query = format!(
            "WITH q AS (
                INSERT INTO video_questions (sub_activity_id, user_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT {QUESTION_COLUMNS} FROM q JOIN users u ON u.id = q.user_id"
        );
        sqlx::query_as::<_, VideoQuestion>(&query)
            .bind(sub_activity_id)
            .bind(user_id)
            .bind(body.trim())
            .fetch_one(pool)
            .await
    }

    /// Questions on a lesson, oldest first.
    pub async fn list_for_lesson(
        pool: &PgPool,
        sub_activity_id: DbId,
    ) -> Result<Vec<VideoQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {QUESTION_COLUMNS}
             FROM video_questions q JOIN users u ON u.id = q.user_id
             WHERE q.sub_activity_id = $1
             ORDER BY q.created_at, q.id"
        );
        sqlx::query_as::<_, VideoQuestion>(&query)
            .bind(sub_activity_id)
            .fetch_all(pool)
            .await
    }

    /// Answer a question.
    pub async fn create_response(
        pool: &PgPool,
        question_id: DbId,
        user_id: DbId,
        body: &str,
    ) -> Result<VideoResponse, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                INSERT INTO video_responses (question_id, user_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT {RESPONSE_COLUMNS} FROM r JOIN users u ON u.id = r.user_id"
        );
        sqlx::query_as::<_, VideoResponse>(&query)
            .bind(question_id)
            .bind(user_id)
            .bind(body.trim())
            .fetch_one(pool)
            .await
    }

    /// Responses to any of `question_ids`, oldest first.
    pub async fn list_responses(
        pool: &PgPool,
        question_ids: &[DbId],
    ) -> Result<Vec<VideoResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS}
             FROM video_responses r JOIN users u ON u.id = r.user_id
             WHERE r.question_id = ANY($1)
             ORDER BY r.created_at, r.id"
        );
        sqlx::query_as::<_, VideoResponse>(&query)
            .bind(question_ids)
            .fetch_all(pool)
            .await
    }

    /// Instructor of the course a question was asked in.
    pub async fn instructor_of_question(
        pool: &PgPool,
        question_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT c.instructor_id
             FROM video_questions q
             JOIN sub_activities s ON s.id = q.sub_activity_id
             JOIN activities a ON a.id = s.activity_id
             JOIN courses c ON c.id = a.course_id
             WHERE q.id = $1",
        )
        .bind(question_id)
        .fetch_optional(pool)
        .await
    }

    /// Question inbox, newest first. `instructor_id = None` covers every
    /// course (manager view).
    pub async fn inbox(
        pool: &PgPool,
        instructor_id: Option<DbId>,
        params: &InboxQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InboxQuestion>, sqlx::Error> {
        sqlx::query_as::<_, InboxQuestion>(
            "SELECT q.id, q.sub_activity_id, s.title AS lesson_title, c.id AS course_id,
                    c.title AS course_title, q.user_id, u.full_name AS author_name, q.body,
                    (SELECT COUNT(*) FROM video_responses r WHERE r.question_id = q.id) AS response_count,
                    q.created_at
             FROM video_questions q
             JOIN users u ON u.id = q.user_id
             JOIN sub_activities s ON s.id = q.sub_activity_id
             JOIN activities a ON a.id = s.activity_id
             JOIN courses c ON c.id = a.course_id
             WHERE c.deleted_at IS NULL
               AND ($1::BIGINT IS NULL OR c.instructor_id = $1)
               AND ($2::BIGINT IS NULL OR c.id = $2)
               AND (NOT $3 OR NOT EXISTS (SELECT 1 FROM video_responses r WHERE r.question_id = q.id))
             ORDER BY q.created_at DESC, q.id DESC
             LIMIT $4 OFFSET $5",
        )
        .bind(instructor_id)
        .bind(params.course_id)
        .bind(params.unanswered_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
