use axum::extract::{Query, State};
use axum::Json;
use coursely_db::models::announcement::{Announcement, AnnouncementQuery};
use coursely_db::repositories::AnnouncementRepo;

use crate::error::AppResult;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/announcements
///
/// Platform-wide announcements, plus those for `?course_id=` when given.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AnnouncementQuery>,
) -> AppResult<Json<DataResponse<Vec<Announcement>>>> {
    let (limit, offset) = page(params.limit, params.offset);
    let announcements =
        AnnouncementRepo::list(&state.pool, params.course_id, limit, offset).await?;
    Ok(Json(DataResponse {
        data: announcements,
    }))
}
