//! `GET /health`, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Which optional integrations this instance was started with.
#[derive(Serialize)]
pub struct Integrations {
    pub chapa: bool,
    pub stripe: bool,
    pub telegram: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub integrations: Integrations,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = coursely_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check could not reach the database");
    }

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        integrations: Integrations {
            chapa: state.chapa.is_some(),
            stripe: state.stripe.is_some(),
            telegram: state.telegram.is_some(),
        },
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
