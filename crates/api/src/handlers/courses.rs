//! Handlers for the `/courses` resource: public catalogue and instructor CRUD.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursely_core::error::CoreError;
use coursely_core::types::DbId;
use coursely_core::validation::{validate_body, validate_price, validate_title};
use coursely_db::models::activity::{Activity, SubActivity};
use coursely_db::models::course::{Course, CourseCard, CourseListQuery, CreateCourse, UpdateCourse};
use coursely_db::models::feedback::Feedback;
use coursely_db::repositories::{ActivityRepo, CourseRepo, FeedbackRepo, SubActivityRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::guards::owned_course;
use crate::middleware::rbac::RequireInstructor;
use crate::query::{page, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Lesson as listed in the public outline; no video or content.
#[derive(Debug, Serialize)]
pub struct LessonOutline {
    pub id: DbId,
    pub title: String,
    pub position: i32,
    pub duration_secs: Option<i32>,
}

/// A section with its lessons.
#[derive(Debug, Serialize)]
pub struct SectionOutline<L: Serialize> {
    #[serde(flatten)]
    pub activity: Activity,
    pub lessons: Vec<L>,
}

/// `GET /courses/{id}` payload.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseCard,
    pub sections: Vec<SectionOutline<LessonOutline>>,
}

impl From<SubActivity> for LessonOutline {
    fn from(lesson: SubActivity) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title,
            position: lesson.position,
            duration_secs: lesson.duration_secs,
        }
    }
}

/// Group a course's lessons under its sections, preserving both orders.
pub(crate) async fn load_sections<L: Serialize + From<SubActivity>>(
    state: &AppState,
    course_id: DbId,
) -> AppResult<Vec<SectionOutline<L>>> {
    let activities = ActivityRepo::list_by_course(&state.pool, course_id).await?;
    let mut lessons_by_activity: HashMap<DbId, Vec<L>> = HashMap::new();
    for lesson in SubActivityRepo::list_by_course(&state.pool, course_id).await? {
        lessons_by_activity
            .entry(lesson.activity_id)
            .or_default()
            .push(L::from(lesson));
    }
    Ok(activities
        .into_iter()
        .map(|activity| {
            let lessons = lessons_by_activity.remove(&activity.id).unwrap_or_default();
            SectionOutline { activity, lessons }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Public catalogue
// ---------------------------------------------------------------------------

/// GET /api/v1/courses
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CourseListQuery>,
) -> AppResult<Json<DataResponse<Vec<CourseCard>>>> {
    let (limit, offset) = page(params.limit, params.offset);
    let courses = CourseRepo::list_published(&state.pool, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/{id}
///
/// Published course with its outline and rating summary.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseDetail>>> {
    let course = CourseRepo::find_published(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", id))?;
    let sections = load_sections(&state, id).await?;
    Ok(Json(DataResponse {
        data: CourseDetail { course, sections },
    }))
}

/// GET /api/v1/courses/{id}/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Feedback>>>> {
    let (limit, offset) = params.resolve();
    let feedback = FeedbackRepo::list_for_course(&state.pool, id, limit, offset).await?;
    Ok(Json(DataResponse { data: feedback }))
}

// ---------------------------------------------------------------------------
// Instructor CRUD
// ---------------------------------------------------------------------------

fn validate_course_fields(
    title: Option<&str>,
    description: Option<&str>,
    price_etb: Option<i64>,
    price_usd: Option<i64>,
) -> Result<(), CoreError> {
    if let Some(title) = title {
        validate_title(title)?;
    }
    if let Some(description) = description {
        validate_body(description)?;
    }
    if let Some(price) = price_etb {
        validate_price("price_etb", price)?;
    }
    if let Some(price) = price_usd {
        validate_price("price_usd", price)?;
    }
    Ok(())
}

/// POST /api/v1/courses
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    validate_course_fields(
        Some(&input.title),
        input.description.as_deref(),
        Some(input.price_etb),
        Some(input.price_usd),
    )?;
    let course = CourseRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(course_id = course.id, instructor_id = user.user_id, "Course created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// GET /api/v1/instructor/courses
///
/// The caller's own courses, drafts included.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let courses = CourseRepo::list_by_instructor(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// PUT /api/v1/courses/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    owned_course(&state, &user, id).await?;
    validate_course_fields(
        input.title.as_deref(),
        input.description.as_deref(),
        input.price_etb,
        input.price_usd,
    )?;
    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", id))?;
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_course(&state, &user, id).await?;
    if CourseRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(course_id = id, "Course deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::from(CoreError::not_found("Course", id)))
    }
}
