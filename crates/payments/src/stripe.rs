//! Stripe REST client: Checkout Sessions for USD course purchases.
//!
//! Stripe's API is form-encoded with bracketed keys for nested fields.

use coursely_core::types::MinorUnits;
use serde::Deserialize;

/// Production API base URL.
pub const STRIPE_API_URL: &str = "https://api.stripe.com/v1";

/// HTTP client for the Stripe API.
pub struct StripeClient {
    client: reqwest::Client,
    api_url: String,
    secret_key: String,
}

/// Errors from the Stripe API layer.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Stripe returned a non-2xx status code.
    #[error("Stripe API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The session was created but Stripe returned no redirect URL.
    #[error("Stripe session {0} has no checkout URL")]
    MissingUrl(String),
}

/// Checkout details for a one-off USD payment.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub tx_ref: String,
    /// Amount in cents.
    pub amount: MinorUnits,
    pub product_name: String,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// The subset of a Checkout Session the platform uses.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// A Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Our transaction reference, from `client_reference_id` or
    /// `metadata.tx_ref`.
    pub fn tx_ref(&self) -> Option<&str> {
        let object = &self.data.object;
        object
            .get("client_reference_id")
            .and_then(|v| v.as_str())
            .or_else(|| {
                object
                    .get("metadata")
                    .and_then(|m| m.get("tx_ref"))
                    .and_then(|v| v.as_str())
            })
            .filter(|s| !s.is_empty())
    }

    /// Stripe's id for the underlying object (session, charge, ...).
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(|v| v.as_str())
    }

    /// A completed checkout whose payment has been captured.
    pub fn is_paid_checkout(&self) -> bool {
        self.event_type == "checkout.session.completed"
            && self.data.object.get("payment_status").and_then(|v| v.as_str()) == Some("paid")
    }

    pub fn is_failed_checkout(&self) -> bool {
        matches!(
            self.event_type.as_str(),
            "checkout.session.expired" | "checkout.session.async_payment_failed"
        )
    }

    pub fn is_refund(&self) -> bool {
        self.event_type == "charge.refunded"
    }
}

/// Form fields for `POST /checkout/sessions`.
fn checkout_form(checkout: &CheckoutRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("mode", "payment".to_string()),
        ("success_url", checkout.success_url.clone()),
        ("cancel_url", checkout.cancel_url.clone()),
        ("client_reference_id", checkout.tx_ref.clone()),
        ("metadata[tx_ref]", checkout.tx_ref.clone()),
        // Copied onto the charge so refund events can be matched too.
        ("payment_intent_data[metadata][tx_ref]", checkout.tx_ref.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("line_items[0][price_data][currency]", "usd".to_string()),
        (
            "line_items[0][price_data][unit_amount]",
            checkout.amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            checkout.product_name.clone(),
        ),
    ];
    if let Some(email) = &checkout.customer_email {
        form.push(("customer_email", email.clone()));
    }
    form
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(secret_key, STRIPE_API_URL.to_string())
    }

    /// Point the client at a different API root (tests).
    pub fn with_base_url(secret_key: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    /// Create a Checkout Session and return it with its redirect URL.
    pub async fn create_checkout_session(
        &self,
        checkout: &CheckoutRequest,
    ) -> Result<CheckoutSession, StripeError> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_url))
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(checkout))
            .send()
            .await?;

        let response = crate::ensure_success(response)
            .await
            .map_err(|(status, body)| StripeError::ApiError { status, body })?;
        let session: CheckoutSession = response.json().await?;
        if session.url.is_none() {
            return Err(StripeError::MissingUrl(session.id));
        }
        tracing::debug!(tx_ref = %checkout.tx_ref, session_id = %session.id, "Stripe session created");
        Ok(session)
    }
}
