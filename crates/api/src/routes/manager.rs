//! Route definitions for the `/manager` resource. All routes require the
//! manager role.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{manager, reports};
use crate::state::AppState;

/// Routes mounted at `/manager`.
///
/// ```text
/// GET    /users                -> list_users
/// PUT    /users/{id}           -> update_user
/// DELETE /users/{id}           -> deactivate_user
/// GET    /roles                -> list_roles
///
/// GET    /income-rates         -> get_income_rates
/// PUT    /income-rates         -> update_income_rates
///
/// GET    /channels             -> list_channels
/// POST   /channels             -> create_channel
/// GET    /channels/{id}        -> get_channel (with members)
/// PUT    /channels/{id}        -> update_channel
/// DELETE /channels/{id}        -> delete_channel
///
/// POST   /announcements        -> create_announcement
/// DELETE /announcements/{id}   -> delete_announcement
///
/// GET    /orders               -> list_orders
/// POST   /orders/{id}/refund   -> refund_order
///
/// GET    /overview             -> manager_overview
/// GET    /overview/data        -> manager_overview_data (bucket series)
/// GET    /sellers              -> manager_sellers
/// GET    /courses              -> manager_courses
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(manager::list_users))
        .route("/roles", get(manager::list_roles))
        .route(
            "/users/{id}",
            put(manager::update_user).delete(manager::deactivate_user),
        )
        .route(
            "/income-rates",
            get(manager::get_income_rates).put(manager::update_income_rates),
        )
        .route(
            "/channels",
            get(manager::list_channels).post(manager::create_channel),
        )
        .route(
            "/channels/{id}",
            get(manager::get_channel)
                .put(manager::update_channel)
                .delete(manager::delete_channel),
        )
        .route("/announcements", post(manager::create_announcement))
        .route("/announcements/{id}", delete(manager::delete_announcement))
        .route("/orders", get(manager::list_orders))
        .route("/orders/{id}/refund", post(manager::refund_order))
        .route("/overview", get(reports::manager_overview))
        .route("/overview/data", get(reports::manager_overview_data))
        .route("/sellers", get(reports::manager_sellers))
        .route("/courses", get(reports::manager_courses))
}
