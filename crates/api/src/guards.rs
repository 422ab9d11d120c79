//! Ownership and enrollment checks shared by handlers.

use std::collections::HashSet;

use coursely_core::error::CoreError;
use coursely_core::types::DbId;
use coursely_db::models::activity::SubActivity;
use coursely_db::models::course::Course;
use coursely_db::repositories::{CompletionRepo, CourseRepo, OrderRepo, SubActivityRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// A live (not deleted) course, or 404.
pub async fn find_course(state: &AppState, course_id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", course_id).into())
}

/// A course the caller may edit: their own, or any course for a manager.
pub async fn owned_course(state: &AppState, user: &AuthUser, course_id: DbId) -> AppResult<Course> {
    let course = find_course(state, course_id).await?;
    if course.instructor_id != user.user_id && !user.is_manager() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this course".into(),
        )));
    }
    Ok(course)
}

/// A lesson and the id of the course it belongs to, or 404.
pub async fn find_lesson(state: &AppState, lesson_id: DbId) -> AppResult<(SubActivity, DbId)> {
    let not_found = || AppError::from(CoreError::not_found("Lesson", lesson_id));
    let lesson = SubActivityRepo::find_by_id(&state.pool, lesson_id)
        .await?
        .ok_or_else(not_found)?;
    let course_id = SubActivityRepo::course_id_of(&state.pool, lesson_id)
        .await?
        .ok_or_else(not_found)?;
    Ok((lesson, course_id))
}

/// Whether the caller teaches `course` or manages the platform.
pub fn is_staff_for(user: &AuthUser, course: &Course) -> bool {
    user.is_manager() || course.instructor_id == user.user_id
}

/// Require a paid order for the course; staff of the course pass too.
pub async fn ensure_enrolled(state: &AppState, user: &AuthUser, course: &Course) -> AppResult<()> {
    if is_staff_for(user, course) {
        return Ok(());
    }
    if !OrderRepo::has_paid(&state.pool, user.user_id, course.id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Enroll in this course first".into(),
        )));
    }
    Ok(())
}

/// Ordered lesson ids and the caller's completed set for a course.
pub async fn course_progress_inputs(
    state: &AppState,
    user_id: DbId,
    course_id: DbId,
) -> AppResult<(Vec<DbId>, HashSet<DbId>)> {
    let ordered = SubActivityRepo::ordered_ids_for_course(&state.pool, course_id).await?;
    let completed: HashSet<DbId> =
        CompletionRepo::completed_ids_for_course(&state.pool, user_id, course_id)
            .await?
            .into_iter()
            .collect();
    Ok((ordered, completed))
}
