//! HTTP clients for the payment gateways.
//!
//! - [`chapa`] -- Chapa hosted checkout for ETB.
//! - [`stripe`] -- Stripe Checkout Sessions for USD.
//!
//! Signature verification for incoming webhooks lives in
//! `coursely_core::payments`; this crate only talks to the providers.

pub mod chapa;
pub mod stripe;

pub use chapa::{ChapaClient, ChapaError};
pub use stripe::{StripeClient, StripeError};

/// Ensure the response has a success status, returning the status and
/// body text otherwise.
async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, (u16, String)> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err((status.as_u16(), body));
    }
    Ok(response)
}
