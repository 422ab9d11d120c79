use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Gateway event bodies are small JSON documents.
const WEBHOOK_BODY_LIMIT: usize = 64 * 1024;

/// Routes mounted at `/webhooks`. Authenticated by gateway signature, not JWT.
///
/// ```text
/// POST /chapa   -> chapa
/// POST /stripe  -> stripe
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chapa", post(webhooks::chapa))
        .route("/stripe", post(webhooks::stripe))
        .layer(DefaultBodyLimit::max(WEBHOOK_BODY_LIMIT))
}
