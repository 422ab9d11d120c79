//! Client tests against a local stand-in for the provider APIs.

use std::collections::HashMap;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use coursely_payments::chapa::{self, ChapaClient, ChapaError};
use coursely_payments::stripe::{self, StripeClient, StripeError};
use serde_json::{json, Value};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn chapa_checkout() -> chapa::CheckoutRequest {
    chapa::CheckoutRequest {
        tx_ref: "CRS-1".into(),
        amount: 50_000,
        email: "buyer@example.com".into(),
        full_name: "Abebe Kebede".into(),
        phone_number: None,
        callback_url: "http://cb".into(),
        return_url: "http://ret".into(),
        title: "Rust".into(),
    }
}

#[tokio::test]
async fn chapa_initialize_returns_checkout_url() {
    let app = Router::new().route(
        "/transaction/initialize",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            if bearer(&headers) != Some("sk_test") || body["amount"] != "500.00" {
                return (StatusCode::UNAUTHORIZED, Json(json!({"status": "failed"})));
            }
            assert_eq!(body["first_name"], "Abebe");
            assert_eq!(body["currency"], "ETB");
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Hosted Link",
                    "status": "success",
                    "data": { "checkout_url": "https://checkout.chapa.co/abc" }
                })),
            )
        }),
    );
    let client = ChapaClient::with_base_url("sk_test".into(), serve(app).await);

    let url = client.initialize(&chapa_checkout()).await.unwrap();
    assert_eq!(url, "https://checkout.chapa.co/abc");
}

#[tokio::test]
async fn chapa_non_success_status_is_api_error() {
    let app = Router::new().route(
        "/transaction/initialize",
        post(|| async { (StatusCode::BAD_REQUEST, "bad email") }),
    );
    let client = ChapaClient::with_base_url("sk".into(), serve(app).await);

    match client.initialize(&chapa_checkout()).await {
        Err(ChapaError::ApiError { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad email");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn chapa_verify_parses_transaction() {
    let app = Router::new().route(
        "/transaction/verify/{tx_ref}",
        get(|Path(tx_ref): Path<String>| async move {
            Json(json!({
                "message": "Payment details",
                "status": "success",
                "data": {
                    "status": "success",
                    "tx_ref": tx_ref,
                    "currency": "ETB",
                    "amount": "500.00",
                    "reference": "APxyz"
                }
            }))
        }),
    );
    let client = ChapaClient::with_base_url("sk".into(), serve(app).await);

    let tx = client.verify("CRS-9").await.unwrap();
    assert!(tx.is_success());
    assert_eq!(tx.tx_ref.as_deref(), Some("CRS-9"));
    assert_eq!(tx.amount_minor(), Some(50_000));
    assert_eq!(tx.reference.as_deref(), Some("APxyz"));
}

#[tokio::test]
async fn chapa_failed_envelope_is_rejected() {
    let app = Router::new().route(
        "/transaction/verify/{tx_ref}",
        get(|| async { Json(json!({"message": "Invalid transaction", "status": "failed", "data": null})) }),
    );
    let client = ChapaClient::with_base_url("sk".into(), serve(app).await);

    assert!(matches!(client.verify("nope").await, Err(ChapaError::Rejected(_))));
}

fn stripe_checkout() -> stripe::CheckoutRequest {
    stripe::CheckoutRequest {
        tx_ref: "CRS-2".into(),
        amount: 2_500,
        product_name: "Go".into(),
        customer_email: Some("buyer@example.com".into()),
        success_url: "https://x/ok".into(),
        cancel_url: "https://x/no".into(),
    }
}

#[tokio::test]
async fn stripe_session_is_form_encoded() {
    let app = Router::new().route(
        "/checkout/sessions",
        post(
            |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                let ok = bearer(&headers) == Some("sk_stripe")
                    && form.get("mode").map(String::as_str) == Some("payment")
                    && form.get("line_items[0][price_data][unit_amount]").map(String::as_str)
                        == Some("2500")
                    && form.get("client_reference_id").map(String::as_str) == Some("CRS-2");
                if !ok {
                    return (StatusCode::BAD_REQUEST, Json(json!({"error": form})));
                }
                (
                    StatusCode::OK,
                    Json(json!({"id": "cs_test_1", "url": "https://checkout.stripe.com/c/1"})),
                )
            },
        ),
    );
    let client = StripeClient::with_base_url("sk_stripe".into(), serve(app).await);

    let session = client.create_checkout_session(&stripe_checkout()).await.unwrap();
    assert_eq!(session.id, "cs_test_1");
    assert_eq!(session.url.as_deref(), Some("https://checkout.stripe.com/c/1"));
}

#[tokio::test]
async fn stripe_session_without_url_is_an_error() {
    let app = Router::new().route(
        "/checkout/sessions",
        post(|| async { Json(json!({"id": "cs_test_2", "url": null})) }),
    );
    let client = StripeClient::with_base_url("sk".into(), serve(app).await);

    assert!(matches!(
        client.create_checkout_session(&stripe_checkout()).await,
        Err(StripeError::MissingUrl(id)) if id == "cs_test_2"
    ));
}
