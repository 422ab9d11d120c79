pub mod auth;
pub mod courses;
pub mod health;
pub mod instructor;
pub mod manager;
pub mod me;
pub mod seller;
pub mod webhooks;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                         student signup (public)
/// /auth/login                            login (public)
/// /auth/refresh                          refresh (public)
/// /auth/logout                           logout (requires auth)
/// /auth/sessions                         caller's signed-in devices
/// /auth/me                               current user
///
/// /courses                               catalog, create (instructor)
/// /courses/{id}                          detail, update, delete
/// /courses/{id}/activities               outline, add section
/// /courses/{id}/feedback                 ratings, rate (buyer)
/// /courses/{id}/progress                 caller's progress
/// /courses/{id}/checkout                 start a gateway payment
/// /activities/{id}                       update, delete section
/// /activities/{id}/lessons               add lesson
/// /lessons/{id}                          view, update, delete lesson
/// /lessons/{id}/complete                 mark complete
/// /lessons/{id}/questions                list, ask
/// /questions/{id}/responses              answer (course instructor)
///
/// /me/courses                            enrolled courses with progress
/// /me/orders                             caller's orders
/// /me/orders/{id}/verify                 re-check a pending Chapa order
/// /me/telegram/link-code                 one-time code for the Telegram bot
///
/// /announcements                         public list
/// /assistant                             templated course assistant
///
/// /instructor/courses                    own courses
/// /instructor/questions                  Q&A inbox
/// /instructor/overview                   sales of own courses
///
/// /seller/sales                          list, record offline sale
/// /seller/overview                       sales and commission
///
/// /manager/...                           users, roles, rates, channels,
///                                        orders and dashboards
///
/// /webhooks/chapa                        Chapa callback (signed)
/// /webhooks/stripe                       Stripe events (signed)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/courses", courses::router())
        .nest("/activities", courses::activity_router())
        .nest("/lessons", courses::lesson_router())
        .route(
            "/questions/{id}/responses",
            post(handlers::questions::respond),
        )
        .nest("/me", me::router())
        .route("/announcements", get(handlers::announcements::list))
        .route("/assistant", post(handlers::assistant::ask))
        .nest("/instructor", instructor::router())
        .nest("/seller", seller::router())
        .nest("/manager", manager::router())
        .nest("/webhooks", webhooks::router())
}
