//! Repository for the `courses` table.

use coursely_core::search::like_pattern;
use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CourseCard, CourseListQuery, CreateCourse, UpdateCourse};
use crate::models::report::NamedId;

const COLUMNS: &str = "id, instructor_id, title, description, thumbnail_url, price_etb, \
                       price_usd, is_published, created_at, updated_at, deleted_at";

/// Catalogue projection: published, not deleted, with instructor name and
/// rating aggregate. Callers append `WHERE` extras, `GROUP BY` and paging.
const CARD_SELECT: &str = "SELECT c.id, c.instructor_id, u.full_name AS instructor_name, c.title, \
            c.description, c.thumbnail_url, c.price_etb, c.price_usd, \
            AVG(f.rating)::FLOAT8 AS rating_avg, COUNT(f.id) AS rating_count, c.created_at
     FROM courses c
     JOIN users u ON u.id = c.instructor_id
     LEFT JOIN feedbacks f ON f.course_id = c.id
     WHERE c.deleted_at IS NULL AND c.is_published = true";

/// Provides CRUD operations for courses. Deleted courses are soft-deleted
/// and hidden from every read.
pub struct CourseRepo;

impl CourseRepo {
    pub async fn create(
        pool: &PgPool,
        instructor_id: DbId,
        input: &CreateCourse,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses
                (instructor_id, title, description, thumbnail_url, price_etb, price_usd, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(instructor_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.thumbnail_url)
            .bind(input.price_etb)
            .bind(input.price_usd)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    /// Find a course by ID, published or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Catalogue entry for a published course.
    pub async fn find_published(pool: &PgPool, id: DbId) -> Result<Option<CourseCard>, sqlx::Error> {
        let query = format!("{CARD_SELECT} AND c.id = $1 GROUP BY c.id, u.full_name");
        sqlx::query_as::<_, CourseCard>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Public catalogue, newest first.
    pub async fn list_published(
        pool: &PgPool,
        params: &CourseListQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CourseCard>, sqlx::Error> {
        let query = format!(
            "{CARD_SELECT}
               AND ($1::TEXT IS NULL OR c.title ILIKE $1 OR c.description ILIKE $1)
               AND ($2::BIGINT IS NULL OR c.instructor_id = $2)
             GROUP BY c.id, u.full_name
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $3 OFFSET $4"
        );
        let pattern = params
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);
        sqlx::query_as::<_, CourseCard>(&query)
            .bind(pattern)
            .bind(params.instructor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All courses owned by an instructor, including drafts.
    pub async fn list_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses
             WHERE instructor_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(instructor_id)
            .fetch_all(pool)
            .await
    }

    /// Courses the user has a paid order for.
    pub async fn list_enrolled(pool: &PgPool, user_id: DbId) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses
             WHERE deleted_at IS NULL
               AND id IN (SELECT course_id FROM orders WHERE user_id = $1 AND status = 'paid')
             ORDER BY title ASC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail_url = COALESCE($4, thumbnail_url),
                price_etb = COALESCE($5, price_etb),
                price_usd = COALESCE($6, price_usd),
                is_published = COALESCE($7, is_published)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.thumbnail_url)
            .bind(input.price_etb)
            .bind(input.price_usd)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a course. Returns `false` if it was already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE courses SET deleted_at = NOW(), is_published = false
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Titles for the given course ids, deleted courses included.
    pub async fn titles(pool: &PgPool, ids: &[DbId]) -> Result<Vec<NamedId>, sqlx::Error> {
        sqlx::query_as::<_, NamedId>("SELECT id, title AS name FROM courses WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
