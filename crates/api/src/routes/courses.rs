//! Route definitions for courses, their outline and lessons.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{checkout, courses, learning, outline, questions};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                    -> list (published catalog)
/// POST   /                    -> create (instructor)
/// GET    /{id}                -> get_by_id (published, with outline)
/// PUT    /{id}                -> update (owner)
/// DELETE /{id}                -> delete (owner, soft)
/// GET    /{id}/activities     -> full outline (enrolled)
/// POST   /{id}/activities     -> create_activity (owner)
/// GET    /{id}/feedback       -> list_feedback
/// POST   /{id}/feedback       -> leave_feedback (buyer)
/// GET    /{id}/progress       -> course_progress (enrolled)
/// POST   /{id}/checkout       -> checkout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list).post(courses::create))
        .route(
            "/{id}",
            get(courses::get_by_id)
                .put(courses::update)
                .delete(courses::delete),
        )
        .route(
            "/{id}/activities",
            get(outline::list_for_course).post(outline::create_activity),
        )
        .route(
            "/{id}/feedback",
            get(courses::list_feedback).post(learning::leave_feedback),
        )
        .route("/{id}/progress", get(learning::course_progress))
        .route("/{id}/checkout", post(checkout::checkout))
}

/// Routes mounted at `/activities`.
///
/// ```text
/// PUT    /{id}          -> update_activity (owner)
/// DELETE /{id}          -> delete_activity (owner)
/// POST   /{id}/lessons  -> create_lesson (owner)
/// ```
pub fn activity_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            put(outline::update_activity).delete(outline::delete_activity),
        )
        .route("/{id}/lessons", post(outline::create_lesson))
}

/// Routes mounted at `/lessons`.
///
/// ```text
/// GET    /{id}            -> get_lesson (enrolled, unlocked)
/// PUT    /{id}            -> update_lesson (owner)
/// DELETE /{id}            -> delete_lesson (owner)
/// POST   /{id}/complete   -> complete_lesson
/// GET    /{id}/questions  -> list_for_lesson
/// POST   /{id}/questions  -> ask
/// ```
pub fn lesson_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(outline::get_lesson)
                .put(outline::update_lesson)
                .delete(outline::delete_lesson),
        )
        .route("/{id}/complete", post(learning::complete_lesson))
        .route(
            "/{id}/questions",
            get(questions::list_for_lesson).post(questions::ask),
        )
}
