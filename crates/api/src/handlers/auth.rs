//! `/auth`: student signup, password login, refresh-token rotation, logout,
//! the caller's devices and profile.

use std::net::IpAddr;

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Duration, Utc};
use coursely_core::error::CoreError;
use coursely_core::roles::Role;
use coursely_db::models::session::{CreateSession, SessionResponse};
use coursely_db::models::user::{CreateUser, User, UserResponse};
use coursely_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failed logins that lock an account.
const MAX_FAILED_ATTEMPTS: i32 = 5;
const LOCK_DURATION_MINS: i32 = 15;
/// Longest `User-Agent` kept on a session row.
const MAX_USER_AGENT_LEN: usize = 256;
const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

fn deactivated() -> AppError {
    AppError::Core(CoreError::Forbidden("Account is deactivated".into()))
}

/// Device details recorded on a session.
struct ClientInfo {
    user_agent: Option<String>,
    ip_address: Option<String>,
}

impl ClientInfo {
    /// The proxy sets `X-Forwarded-For`; its first hop is the client.
    fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            user_agent: text(USER_AGENT.as_str())
                .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect()),
            ip_address: text(FORWARDED_FOR)
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|ip| ip.parse::<IpAddr>().is_ok())
                .map(str::to_string),
        }
    }
}

/// POST /api/v1/auth/register
///
/// Student self-signup. Instructors, sellers and managers are promoted by
/// a manager afterwards.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            full_name: input.full_name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            phone: input
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            password_hash,
            role_id: Role::Student.id(),
            referral_code: None,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "Student registered");

    let response = start_session(&state, &user, ClientInfo::from_headers(&headers)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(deactivated());
    }
    if let Some(locked_until) = user.locked_until.filter(|until| *until > Utc::now()) {
        let minutes = (locked_until - Utc::now()).num_minutes() + 1;
        return Err(CoreError::Locked { minutes }.into());
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        record_failed_login(&state, &user).await?;
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    let response = start_session(&state, &user, ClientInfo::from_headers(&headers)).await?;
    Ok(Json(response))
}

/// Count a failed attempt; the attempt that reaches the limit locks the account.
async fn record_failed_login(state: &AppState, user: &User) -> AppResult<()> {
    let locked_until = UserRepo::record_failed_login(
        &state.pool,
        user.id,
        MAX_FAILED_ATTEMPTS,
        LOCK_DURATION_MINS,
    )
    .await?;
    if let Some(until) = locked_until {
        tracing::warn!(user_id = user.id, %until, "Account locked after failed logins");
    }
    Ok(())
}

/// POST /api/v1/auth/refresh
///
/// Refresh tokens are single use: the presented one is revoked and a new
/// pair is issued.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    };
    let session = SessionRepo::find_live_by_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(invalid)?;
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        return Err(invalid());
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    if !user.is_active {
        return Err(deactivated());
    }

    let client = ClientInfo::from_headers(&headers);
    let client = ClientInfo {
        user_agent: client.user_agent.or(session.user_agent),
        ip_address: client.ip_address.or(session.ip_address),
    };
    let response = start_session(&state, &user, client).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Ends every session of the caller, on all devices.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::debug!(user_id = auth_user.user_id, revoked, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/sessions
///
/// The caller's signed-in devices.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SessionResponse>>>> {
    let sessions = SessionRepo::list_live_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse {
        data: sessions.into_iter().map(SessionResponse::from).collect(),
    }))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth_user.user_id))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// Mint a token pair and persist the refresh half as a new session.
async fn start_session(
    state: &AppState,
    user: &User,
    client: ClientInfo,
) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let role = user.role().ok_or_else(|| {
        AppError::InternalError(format!("User {} has unknown role id {}", user.id, user.role_id))
    })?;
    let access_token = generate_access_token(user.id, role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let (refresh_token, refresh_token_hash) = generate_refresh_token();

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash,
            expires_at: Utc::now() + Duration::days(jwt.refresh_token_expiry_days),
            user_agent: client.user_agent,
            ip_address: client.ip_address,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: jwt.access_token_expiry_mins * 60,
        user: UserResponse::from(user),
    })
}
