//! Chapa REST client: transaction initialization and verification.

use coursely_core::payments::Currency;
use coursely_core::types::MinorUnits;
use serde::{Deserialize, Serialize};

/// Production API base URL.
pub const CHAPA_API_URL: &str = "https://api.chapa.co/v1";

/// HTTP client for the Chapa API.
pub struct ChapaClient {
    client: reqwest::Client,
    api_url: String,
    secret_key: String,
}

/// Errors from the Chapa API layer.
#[derive(Debug, thiserror::Error)]
pub enum ChapaError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Chapa returned a non-2xx status code.
    #[error("Chapa API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// Chapa answered 2xx but reported a failure in the envelope.
    #[error("Chapa rejected the request: {0}")]
    Rejected(String),
}

/// Checkout details for a hosted payment page.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub tx_ref: String,
    pub amount: MinorUnits,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    /// Where Chapa sends the server-to-server callback.
    pub callback_url: String,
    /// Where the buyer lands after paying.
    pub return_url: String,
    pub title: String,
}

/// Wire body for `POST /transaction/initialize`.
#[derive(Debug, Serialize)]
struct InitializeBody<'a> {
    amount: String,
    currency: &'static str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    tx_ref: &'a str,
    callback_url: &'a str,
    return_url: &'a str,
    #[serde(rename = "customization[title]")]
    title: &'a str,
}

/// Chapa's `{ message, status, data }` response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: serde_json::Value,
    status: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    checkout_url: String,
}

/// Transaction details returned by `GET /transaction/verify/{tx_ref}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedTransaction {
    /// `success`, `pending` or `failed`.
    pub status: String,
    pub tx_ref: Option<String>,
    pub currency: Option<String>,
    /// Chapa sends this as a number or a decimal string.
    #[serde(default)]
    pub amount: serde_json::Value,
    /// Chapa's own reference for the charge.
    pub reference: Option<String>,
}

impl VerifiedTransaction {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    /// Amount in minor units, if Chapa sent a parseable amount.
    pub fn amount_minor(&self) -> Option<MinorUnits> {
        let major = match &self.amount {
            serde_json::Value::Number(n) => n.as_f64()?,
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        Some((major * 100.0).round() as MinorUnits)
    }
}

/// Body Chapa posts to the callback URL and webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub tx_ref: String,
    /// `success` or `failed`.
    pub status: String,
    pub reference: Option<String>,
    /// e.g. `charge.success`, `charge.refunded`.
    pub event: Option<String>,
}

impl WebhookPayload {
    pub fn is_refund(&self) -> bool {
        self.event
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case("charge.refunded"))
            || self.status.eq_ignore_ascii_case("refunded")
    }

    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// Split a full name into Chapa's first/last name fields.
fn split_name(full_name: &str) -> (&str, &str) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (trimmed, ""),
    }
}

impl ChapaClient {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(secret_key, CHAPA_API_URL.to_string())
    }

    /// Point the client at a different API root (sandbox, tests).
    pub fn with_base_url(secret_key: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    /// Start a hosted checkout and return the URL to redirect the buyer to.
    pub async fn initialize(&self, checkout: &CheckoutRequest) -> Result<String, ChapaError> {
        let (first_name, last_name) = split_name(&checkout.full_name);
        let body = InitializeBody {
            amount: Currency::Etb.format_amount(checkout.amount),
            currency: Currency::Etb.code(),
            email: &checkout.email,
            first_name,
            last_name,
            phone_number: checkout.phone_number.as_deref(),
            tx_ref: &checkout.tx_ref,
            callback_url: &checkout.callback_url,
            return_url: &checkout.return_url,
            title: &checkout.title,
        };

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.api_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await?;

        let data: InitializeData = Self::parse_envelope(response).await?;
        tracing::debug!(tx_ref = %checkout.tx_ref, "Chapa checkout initialized");
        Ok(data.checkout_url)
    }

    /// Ask Chapa for the authoritative state of a transaction.
    pub async fn verify(&self, tx_ref: &str) -> Result<VerifiedTransaction, ChapaError> {
        let response = self
            .client
            .get(format!("{}/transaction/verify/{tx_ref}", self.api_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::parse_envelope(response).await
    }

    // ---- private helpers ----

    async fn parse_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ChapaError> {
        let response = crate::ensure_success(response)
            .await
            .map_err(|(status, body)| ChapaError::ApiError { status, body })?;
        let envelope: Envelope<T> = response.json().await?;
        if !envelope.status.eq_ignore_ascii_case("success") {
            return Err(ChapaError::Rejected(envelope.message.to_string()));
        }
        envelope
            .data
            .ok_or_else(|| ChapaError::Rejected("response has no data".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_name_handles_single_and_multi_word() {
        assert_eq!(split_name("Abebe Bikila"), ("Abebe", "Bikila"));
        assert_eq!(split_name("  Tirunesh  Dibaba Jr "), ("Tirunesh", "Dibaba Jr"));
        assert_eq!(split_name("Haile"), ("Haile", ""));
    }

    #[test]
    fn initialize_body_uses_decimal_amount_and_bracket_keys() {
        let body = InitializeBody {
            amount: Currency::Etb.format_amount(150_050),
            currency: "ETB",
            email: "a@b.c",
            first_name: "A",
            last_name: "B",
            phone_number: None,
            tx_ref: "CRS-1",
            callback_url: "http://cb",
            return_url: "http://ret",
            title: "Course",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], "1500.50");
        assert_eq!(json["customization[title]"], "Course");
        assert!(json.get("phone_number").is_none());
    }

    #[test]
    fn verified_amount_accepts_number_or_string() {
        let mut tx = VerifiedTransaction {
            status: "success".into(),
            tx_ref: None,
            currency: None,
            amount: serde_json::json!(12.5),
            reference: None,
        };
        assert_eq!(tx.amount_minor(), Some(1_250));
        tx.amount = serde_json::json!("99.99");
        assert_eq!(tx.amount_minor(), Some(9_999));
        tx.amount = serde_json::Value::Null;
        assert_eq!(tx.amount_minor(), None);
        assert!(tx.is_success());
    }

    #[test]
    fn webhook_refund_detection() {
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "event": "charge.refunded",
            "tx_ref": "CRS-1",
            "status": "success"
        }))
        .unwrap();
        assert!(payload.is_refund());

        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "tx_ref": "CRS-2",
            "status": "success",
            "reference": "APabc"
        }))
        .unwrap();
        assert!(!payload.is_refund());
        assert!(payload.is_success());
    }
}
