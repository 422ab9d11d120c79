use axum::routing::get;
use axum::Router;

use crate::handlers::{courses, questions, reports};
use crate::state::AppState;

/// Routes mounted at `/instructor`.
///
/// ```text
/// GET /courses    -> list_mine
/// GET /questions  -> inbox
/// GET /overview   -> instructor_overview
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(courses::list_mine))
        .route("/questions", get(questions::inbox))
        .route("/overview", get(reports::instructor_overview))
}
