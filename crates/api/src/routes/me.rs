//! Route definitions for the caller's own resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{checkout, learning, telegram};
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// GET  /courses             -> my_courses (with progress)
/// GET  /orders              -> my_orders
/// POST /orders/{id}/verify  -> verify_order (Chapa)
/// POST /telegram/link-code  -> create_link_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(learning::my_courses))
        .route("/orders", get(checkout::my_orders))
        .route("/orders/{id}/verify", post(checkout::verify_order))
        .route("/telegram/link-code", post(telegram::create_link_code))
}
