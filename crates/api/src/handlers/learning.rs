//! Student learning endpoints: enrolled courses, lesson completion,
//! progress and course feedback.

use axum::extract::{Path, State};
use axum::Json;
use coursely_core::error::CoreError;
use coursely_core::progress::{is_unlocked, summarize, CourseProgress};
use coursely_core::types::DbId;
use coursely_core::validation::{validate_body, validate_rating};
use coursely_db::models::course::Course;
use coursely_db::models::feedback::{Feedback, UpsertFeedback};
use coursely_db::repositories::{CompletionRepo, CourseRepo, FeedbackRepo, OrderRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::guards::{course_progress_inputs, ensure_enrolled, find_course, find_lesson, is_staff_for};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// An enrolled course with the caller's progress.
#[derive(Debug, Serialize)]
pub struct EnrolledCourse {
    #[serde(flatten)]
    pub course: Course,
    pub progress: CourseProgress,
}

/// Progress for the caller in `course_id`.
pub(crate) async fn progress_for(
    state: &AppState,
    user_id: DbId,
    course_id: DbId,
) -> AppResult<CourseProgress> {
    let (ordered, completed) = course_progress_inputs(state, user_id, course_id).await?;
    Ok(summarize(&ordered, &completed))
}

/// GET /api/v1/me/courses
pub async fn my_courses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<EnrolledCourse>>>> {
    let courses = CourseRepo::list_enrolled(&state.pool, user.user_id).await?;
    let mut enrolled = Vec::with_capacity(courses.len());
    for course in courses {
        let progress = progress_for(&state, user.user_id, course.id).await?;
        enrolled.push(EnrolledCourse { course, progress });
    }
    Ok(Json(DataResponse { data: enrolled }))
}

/// GET /api/v1/courses/{id}/progress
pub async fn course_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseProgress>>> {
    let course = find_course(&state, course_id).await?;
    ensure_enrolled(&state, &user, &course).await?;
    let progress = progress_for(&state, user.user_id, course_id).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/lessons/{id}/complete
///
/// Idempotent. Returns the updated course progress.
pub async fn complete_lesson(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseProgress>>> {
    let (_, course_id) = find_lesson(&state, lesson_id).await?;
    let course = find_course(&state, course_id).await?;
    ensure_enrolled(&state, &user, &course).await?;

    let (ordered, completed) = course_progress_inputs(&state, user.user_id, course_id).await?;
    if !is_staff_for(&user, &course) && !is_unlocked(&ordered, &completed, lesson_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Complete the previous lessons first".into(),
        )));
    }

    if CompletionRepo::mark_complete(&state.pool, user.user_id, lesson_id).await? {
        tracing::debug!(user_id = user.user_id, lesson_id, "Lesson completed");
    }
    let progress = progress_for(&state, user.user_id, course_id).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/courses/{id}/feedback
///
/// Leave or replace the caller's rating. Only buyers may rate a course.
pub async fn leave_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<DbId>,
    Json(input): Json<UpsertFeedback>,
) -> AppResult<Json<DataResponse<Feedback>>> {
    find_course(&state, course_id).await?;
    if !OrderRepo::has_paid(&state.pool, user.user_id, course_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only enrolled students can rate a course".into(),
        )));
    }
    validate_rating(input.rating)?;
    if let Some(comment) = &input.comment {
        validate_body(comment)?;
    }
    let feedback = FeedbackRepo::upsert(&state.pool, course_id, user.user_id, &input).await?;
    Ok(Json(DataResponse { data: feedback }))
}
