//! Telegram account linking from the signed-in side.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use coursely_core::error::CoreError;
use coursely_core::link_codes::{generate_link_code, LINK_CODE_TTL_MINS};
use coursely_core::types::Timestamp;
use coursely_db::repositories::{TelegramLinkRepo, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LinkCodeResponse {
    pub code: String,
    /// What to send the bot.
    pub command: String,
    pub expires_at: Timestamp,
}

/// POST /api/v1/me/telegram/link-code
///
/// Issue a one-time code that links the sender's Telegram account to the
/// caller. A new code replaces any unused earlier one.
pub async fn create_link_code(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<(StatusCode, Json<DataResponse<LinkCodeResponse>>)> {
    let account = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user.user_id))?;
    if account.telegram_user_id.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Your account is already linked to Telegram".into(),
        )));
    }

    let (code, hash) = generate_link_code();
    let issued = TelegramLinkRepo::issue(&state.pool, account.id, &hash, LINK_CODE_TTL_MINS).await?;
    tracing::info!(user_id = account.id, "Telegram link code issued");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: LinkCodeResponse {
                command: format!("/link {code}"),
                code,
                expires_at: issued.expires_at,
            },
        }),
    ))
}
