use axum::routing::get;
use axum::Router;

use crate::handlers::seller;
use crate::state::AppState;

/// Routes mounted at `/seller`.
///
/// ```text
/// GET  /sales     -> list_sales
/// POST /sales     -> record_sale (offline sale, paid immediately)
/// GET  /overview  -> overview (sales and commission)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(seller::list_sales).post(seller::record_sale))
        .route("/overview", get(seller::overview))
}
