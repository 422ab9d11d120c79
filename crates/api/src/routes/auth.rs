//! `/auth` routes. Only register, login and refresh are reachable without
//! a bearer token.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// POST /register
/// POST /login
/// POST /refresh    rotates the refresh token
/// POST /logout     revokes every session of the caller
/// GET  /sessions   live sessions of the caller
/// GET  /me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/sessions", get(auth::list_sessions))
        .route("/me", get(auth::me))
}
