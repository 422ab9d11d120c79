//! Handlers for course sections (`activities`) and lessons (`sub_activities`).
//!
//! Writes require ownership of the parent course. Reading a full lesson
//! requires enrollment and, for students, that every earlier lesson is
//! complete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use coursely_core::error::CoreError;
use coursely_core::progress::is_unlocked;
use coursely_core::types::{DbId, Timestamp};
use coursely_core::validation::{validate_body, validate_title};
use coursely_db::models::activity::{
    Activity, CreateActivity, CreateSubActivity, SubActivity, UpdateActivity, UpdateSubActivity,
};
use coursely_db::repositories::{ActivityRepo, CompletionRepo, SubActivityRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::guards::{
    course_progress_inputs, ensure_enrolled, find_course, find_lesson, is_staff_for, owned_course,
};
use crate::handlers::courses::{load_sections, SectionOutline};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

fn activity_not_found(id: DbId) -> AppError {
    AppError::from(CoreError::not_found("Activity", id))
}

fn validate_lesson_text(
    title: Option<&str>,
    content: Option<&str>,
    duration_secs: Option<i32>,
) -> Result<(), CoreError> {
    if let Some(title) = title {
        validate_title(title)?;
    }
    if let Some(content) = content {
        validate_body(content)?;
    }
    if duration_secs.is_some_and(|d| d < 0) {
        return Err(CoreError::Validation(
            "duration_secs must not be negative".into(),
        ));
    }
    Ok(())
}

/// Course id of a section, after checking the caller owns the course.
async fn owned_activity(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Activity> {
    let activity = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| activity_not_found(id))?;
    owned_course(state, user, activity.course_id).await?;
    Ok(activity)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// GET /api/v1/courses/{id}/activities
///
/// Full outline with lesson content, for enrolled students and staff.
pub async fn list_for_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SectionOutline<SubActivity>>>>> {
    let course = find_course(&state, course_id).await?;
    ensure_enrolled(&state, &user, &course).await?;
    let sections = load_sections(&state, course_id).await?;
    Ok(Json(DataResponse { data: sections }))
}

/// POST /api/v1/courses/{id}/activities
pub async fn create_activity(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateActivity>,
) -> AppResult<(StatusCode, Json<DataResponse<Activity>>)> {
    owned_course(&state, &user, course_id).await?;
    validate_title(&input.title)?;
    let activity = ActivityRepo::create(&state.pool, course_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: activity })))
}

/// PUT /api/v1/activities/{id}
pub async fn update_activity(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateActivity>,
) -> AppResult<Json<DataResponse<Activity>>> {
    owned_activity(&state, &user, id).await?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    let activity = ActivityRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| activity_not_found(id))?;
    Ok(Json(DataResponse { data: activity }))
}

/// DELETE /api/v1/activities/{id}
pub async fn delete_activity(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_activity(&state, &user, id).await?;
    if ActivityRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(activity_not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Lessons
// ---------------------------------------------------------------------------

/// POST /api/v1/activities/{id}/lessons
pub async fn create_lesson(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(activity_id): Path<DbId>,
    Json(input): Json<CreateSubActivity>,
) -> AppResult<(StatusCode, Json<DataResponse<SubActivity>>)> {
    owned_activity(&state, &user, activity_id).await?;
    validate_lesson_text(Some(&input.title), input.content.as_deref(), input.duration_secs)?;
    let lesson = SubActivityRepo::create(&state.pool, activity_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lesson })))
}

/// A lesson as its reader sees it.
#[derive(Debug, Serialize)]
pub struct LessonView {
    #[serde(flatten)]
    pub lesson: SubActivity,
    /// When the caller completed it, if they have.
    pub completed_at: Option<Timestamp>,
}

/// GET /api/v1/lessons/{id}
///
/// Students may only open a lesson once all earlier lessons are complete.
pub async fn get_lesson(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LessonView>>> {
    let (lesson, course_id) = find_lesson(&state, id).await?;
    let course = find_course(&state, course_id).await?;
    ensure_enrolled(&state, &user, &course).await?;

    if !is_staff_for(&user, &course) {
        let (ordered, completed) = course_progress_inputs(&state, user.user_id, course_id).await?;
        if !is_unlocked(&ordered, &completed, id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Complete the previous lessons first".into(),
            )));
        }
    }
    let completed_at = CompletionRepo::find(&state.pool, user.user_id, id)
        .await?
        .map(|c| c.completed_at);
    Ok(Json(DataResponse {
        data: LessonView {
            lesson,
            completed_at,
        },
    }))
}

/// PUT /api/v1/lessons/{id}
pub async fn update_lesson(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubActivity>,
) -> AppResult<Json<DataResponse<SubActivity>>> {
    let (_, course_id) = find_lesson(&state, id).await?;
    owned_course(&state, &user, course_id).await?;
    validate_lesson_text(input.title.as_deref(), input.content.as_deref(), input.duration_secs)?;
    let lesson = SubActivityRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Lesson", id))?;
    Ok(Json(DataResponse { data: lesson }))
}

/// DELETE /api/v1/lessons/{id}
pub async fn delete_lesson(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let (_, course_id) = find_lesson(&state, id).await?;
    owned_course(&state, &user, course_id).await?;
    SubActivityRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
