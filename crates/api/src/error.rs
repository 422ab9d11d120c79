use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coursely_core::error::CoreError;
use coursely_payments::{ChapaError, StripeError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `coursely_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A payment gateway call failed.
    #[error("Payment gateway error: {0}")]
    Payment(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ChapaError> for AppError {
    fn from(err: ChapaError) -> Self {
        AppError::Payment(format!("Chapa: {err}"))
    }
}

impl From<StripeError> for AppError {
    fn from(err: StripeError) -> Self {
        AppError::Payment(format!("Stripe: {err}"))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Locked { minutes } => (
                    StatusCode::FORBIDDEN,
                    "ACCOUNT_LOCKED",
                    format!("Account is temporarily locked. Try again in {minutes} minute(s)."),
                ),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Payment(msg) => {
                tracing::warn!(error = %msg, "Payment gateway error");
                (
                    StatusCode::BAD_GATEWAY,
                    "PAYMENT_GATEWAY_ERROR",
                    "The payment provider could not process the request".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Message shown for a unique violation on a known constraint or index.
fn duplicate_message(constraint: &str) -> Option<&'static str> {
    let message = match constraint {
        "uq_users_email" => "An account with this email already exists",
        "uq_users_referral_code" => "This referral code is already taken",
        "uq_users_telegram_user_id" => "This Telegram account is linked to another user",
        "uq_orders_tx_ref" => "An order with this transaction reference already exists",
        "uq_channels_course_id" => "This course already has a Telegram channel",
        "uq_channel_members_channel_user" => "The user is already a member of this channel",
        "uq_feedbacks_course_user" => "You have already rated this course",
        _ => return None,
    };
    Some(message)
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints map to 409, with a readable
///   message for the ones users can trigger.
/// - Foreign key violations map to 400: the request named a missing row.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let sqlx::Error::Database(db_err) = err else {
        if matches!(err, sqlx::Error::RowNotFound) {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            );
        }
        tracing::error!(error = %err, "Database error");
        return internal();
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        // unique_violation
        Some("23505") if constraint.starts_with("uq_") => {
            let message = duplicate_message(constraint)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Duplicate value violates unique constraint: {constraint}"));
            (StatusCode::CONFLICT, "CONFLICT", message)
        }
        // foreign_key_violation
        Some("23503") => {
            tracing::debug!(constraint, "Foreign key violation");
            (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                "The request references a record that does not exist".to_string(),
            )
        }
        _ => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
    }
}
