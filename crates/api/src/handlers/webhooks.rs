//! Payment gateway webhooks.
//!
//! Both endpoints read the raw body so the signature is checked over the
//! exact bytes the gateway signed, then map the event onto an order status
//! change. Redeliveries are harmless: repeating a status is a no-op.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use coursely_core::error::CoreError;
use coursely_core::payments::{
    verify_chapa_signature, verify_stripe_signature, Gateway, OrderStatus,
    STRIPE_SIGNATURE_TOLERANCE_SECS,
};
use coursely_core::types::DbId;
use coursely_db::models::order::Order;
use coursely_db::repositories::OrderRepo;
use coursely_payments::chapa::WebhookPayload;
use coursely_payments::stripe::WebhookEvent;
use serde::Serialize;

use crate::config::GatewayConfig;
use crate::error::{AppError, AppResult};
use crate::orders::apply_status;
use crate::state::AppState;

/// Headers Chapa may put its signature in.
const CHAPA_SIGNATURE_HEADERS: [&str; 2] = ["x-chapa-signature", "chapa-signature"];
const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// What a webhook delivery did.
#[derive(Debug, Serialize)]
pub struct WebhookOutcome {
    pub order_id: Option<DbId>,
    pub status: Option<String>,
    pub applied: bool,
}

impl WebhookOutcome {
    fn ignored() -> Self {
        Self {
            order_id: None,
            status: None,
            applied: false,
        }
    }
}

fn webhook_config(config: Option<&GatewayConfig>, gateway: Gateway) -> AppResult<&GatewayConfig> {
    config.ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Webhooks for {} are not configured",
            gateway.as_str()
        )))
    })
}

async fn order_by_tx_ref(state: &AppState, tx_ref: &str) -> AppResult<Order> {
    OrderRepo::find_by_tx_ref(&state.pool, tx_ref)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("No order with reference '{tx_ref}'")))
}

async fn settle(
    state: &AppState,
    tx_ref: &str,
    to: OrderStatus,
    gateway_reference: Option<&str>,
) -> AppResult<WebhookOutcome> {
    let order = order_by_tx_ref(state, tx_ref).await?;
    let change = apply_status(state, &order, to, gateway_reference).await?;
    Ok(WebhookOutcome {
        order_id: Some(change.order.id),
        status: Some(change.order.status),
        applied: change.applied,
    })
}

/// POST /api/v1/webhooks/chapa
pub async fn chapa(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookOutcome>> {
    let config = webhook_config(state.config.chapa.as_ref(), Gateway::Chapa)?;

    let signature = CHAPA_SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Missing Chapa signature".into())))?;
    if !verify_chapa_signature(&config.webhook_secret, &body, signature) {
        tracing::warn!("Rejected Chapa webhook with a bad signature");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid Chapa signature".into(),
        )));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid Chapa payload: {e}")))?;
    let to = if payload.is_refund() {
        OrderStatus::Refunded
    } else if payload.is_success() {
        OrderStatus::Paid
    } else {
        OrderStatus::Failed
    };

    tracing::info!(tx_ref = %payload.tx_ref, status = %payload.status, "Chapa webhook received");
    let outcome = settle(&state, &payload.tx_ref, to, payload.reference.as_deref()).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/webhooks/stripe
///
/// Handles completed, failed and refunded checkouts; other event types are
/// acknowledged and ignored.
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookOutcome>> {
    let config = webhook_config(state.config.stripe.as_ref(), Gateway::Stripe)?;

    let header = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Missing Stripe signature".into())))?;
    verify_stripe_signature(
        &config.webhook_secret,
        &body,
        header,
        Utc::now().timestamp(),
        STRIPE_SIGNATURE_TOLERANCE_SECS,
    )
    .inspect_err(|e| tracing::warn!(error = %e, "Rejected Stripe webhook"))?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid Stripe event: {e}")))?;

    let to = if event.is_paid_checkout() {
        OrderStatus::Paid
    } else if event.is_failed_checkout() {
        OrderStatus::Failed
    } else if event.is_refund() {
        OrderStatus::Refunded
    } else {
        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring Stripe event");
        return Ok(Json(WebhookOutcome::ignored()));
    };

    let Some(tx_ref) = event.tx_ref() else {
        tracing::warn!(event_id = %event.id, "Stripe event carries no order reference");
        return Ok(Json(WebhookOutcome::ignored()));
    };

    tracing::info!(event_id = %event.id, event_type = %event.event_type, tx_ref, "Stripe webhook received");
    let outcome = settle(&state, tx_ref, to, event.object_id()).await?;
    Ok(Json(outcome))
}
