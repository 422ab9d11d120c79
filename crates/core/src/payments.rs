//! Payment domain rules: currencies, gateway selection, order status
//! transitions, transaction references, and webhook signature checks.
//!
//! This module lives in `core` (zero internal deps) so both the HTTP layer
//! and the gateway clients can share it.

use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Allowed clock skew for Stripe signature timestamps, in seconds.
pub const STRIPE_SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Length of the random part of a generated `tx_ref`.
const TX_REF_RANDOM_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Currency and gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Etb,
    Usd,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Etb => "ETB",
            Self::Usd => "USD",
        }
    }

    /// Parse an ISO code, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ETB" => Ok(Self::Etb),
            "USD" => Ok(Self::Usd),
            other => Err(CoreError::Validation(format!(
                "Unsupported currency '{other}', expected ETB or USD"
            ))),
        }
    }

    /// Format minor units as a decimal string, e.g. `1250` -> `"12.50"`.
    pub fn format_amount(self, minor: i64) -> String {
        let sign = if minor < 0 { "-" } else { "" };
        let abs = minor.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Which provider settles a given currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gateway {
    Chapa,
    Stripe,
}

impl Gateway {
    pub fn for_currency(currency: Currency) -> Self {
        match currency {
            Currency::Etb => Self::Chapa,
            Currency::Usd => Self::Stripe,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chapa => "chapa",
            Self::Stripe => "stripe",
        }
    }
}

// ---------------------------------------------------------------------------
// Order status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Outcome of applying a status update to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The order is already in the requested status; nothing to do.
    Unchanged,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Check whether an order may move from `self` to `next`.
    ///
    /// `pending -> paid | failed` and `paid -> refunded` are allowed.
    /// Repeating the current status is a no-op so webhook redeliveries
    /// are harmless.
    pub fn transition(self, next: OrderStatus) -> Result<Transition, CoreError> {
        use OrderStatus::*;
        if self == next {
            return Ok(Transition::Unchanged);
        }
        match (self, next) {
            (Pending, Paid) | (Pending, Failed) | (Paid, Refunded) => Ok(Transition::Applied),
            _ => Err(CoreError::Conflict(format!(
                "Cannot move order from {} to {}",
                self.as_str(),
                next.as_str()
            ))),
        }
    }

    /// Whether the buyer currently has access to the course.
    pub fn grants_access(self) -> bool {
        self == Self::Paid
    }
}

// ---------------------------------------------------------------------------
// Transaction references
// ---------------------------------------------------------------------------

/// Generate a unique transaction reference such as `CRS-4kPq...`.
pub fn generate_tx_ref(prefix: &str) -> String {
    let random: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TX_REF_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{prefix}-{random}")
}

// ---------------------------------------------------------------------------
// Webhook signatures
// ---------------------------------------------------------------------------

fn hmac_sha256(secret: &[u8], message: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(message);
    mac
}

/// Hex-encoded HMAC-SHA256 of `message` under `secret`.
pub fn hmac_hex(secret: &str, message: &[u8]) -> String {
    hex::encode(hmac_sha256(secret.as_bytes(), message).finalize().into_bytes())
}

fn verify_hex(secret: &str, message: &[u8], signature_hex: &str) -> bool {
    match hex::decode(signature_hex.trim()) {
        Ok(bytes) => hmac_sha256(secret.as_bytes(), message)
            .verify_slice(&bytes)
            .is_ok(),
        Err(_) => false,
    }
}

/// Verify a Chapa webhook signature.
///
/// Chapa sends `x-chapa-signature` as the HMAC of the raw body and
/// `Chapa-Signature` as the HMAC of the secret itself; either is accepted.
pub fn verify_chapa_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    verify_hex(secret, body, signature) || verify_hex(secret, secret.as_bytes(), signature)
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`).
///
/// The signed payload is `"{t}.{body}"`. Fails when the timestamp is
/// further than `tolerance_secs` from `now_unix`.
pub fn verify_stripe_signature(
    secret: &str,
    body: &[u8],
    header: &str,
    now_unix: i64,
    tolerance_secs: i64,
) -> Result<(), CoreError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        CoreError::Unauthorized("Stripe signature header has no timestamp".into())
    })?;
    if candidates.is_empty() {
        return Err(CoreError::Unauthorized(
            "Stripe signature header has no v1 signature".into(),
        ));
    }
    if now_unix.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(CoreError::Unauthorized(
            "Stripe signature timestamp outside tolerance".into(),
        ));
    }

    let mut signed = format!("{timestamp}.").into_bytes();
    signed.extend_from_slice(body);
    if candidates.iter().any(|sig| verify_hex(secret, &signed, sig)) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized("Stripe signature mismatch".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
