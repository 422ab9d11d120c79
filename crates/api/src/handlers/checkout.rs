//! Checkout: create a pending order and hand the buyer to the gateway that
//! settles the chosen currency (Chapa for ETB, Stripe for USD).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use coursely_core::error::CoreError;
use coursely_core::payments::{generate_tx_ref, Currency, Gateway, OrderStatus};
use coursely_core::types::DbId;
use coursely_core::validation::{normalize_referral_code, validate_referral_code};
use coursely_db::models::course::Course;
use coursely_db::models::order::{CreateOrder, Order};
use coursely_db::models::user::User;
use coursely_db::repositories::{OrderRepo, UserRepo};
use coursely_payments::{chapa, stripe, StripeError};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::guards::find_course;
use crate::middleware::auth::AuthUser;
use crate::orders::apply_status;
use crate::response::DataResponse;
use crate::state::AppState;

/// Prefix of every gateway transaction reference.
const TX_REF_PREFIX: &str = "CRS";

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub currency: String,
    /// Affiliate referral code.
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: DbId,
    pub tx_ref: String,
    pub gateway: Gateway,
    pub checkout_url: String,
}

/// POST /api/v1/courses/{id}/checkout
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<DbId>,
    Json(input): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CheckoutResponse>>)> {
    let currency = Currency::parse(&input.currency)?;
    let gateway = Gateway::for_currency(currency);

    let course = find_course(&state, course_id).await?;
    if !course.is_published {
        return Err(AppError::from(CoreError::not_found("Course", course_id)));
    }
    if OrderRepo::has_paid(&state.pool, user.user_id, course_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "You already own this course".into(),
        )));
    }

    let amount = match currency {
        Currency::Etb => course.price_etb,
        Currency::Usd => course.price_usd,
    };
    if amount <= 0 {
        return Err(AppError::Core(CoreError::Validation(format!(
            "This course is not sold in {}",
            currency.code()
        ))));
    }

    let buyer = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user.user_id))?;
    let code = resolve_referral_code(&state, &buyer, input.code.as_deref()).await?;

    let order = OrderRepo::create(
        &state.pool,
        &CreateOrder {
            user_id: buyer.id,
            course_id,
            seller_id: None,
            currency: currency.code().to_string(),
            amount,
            status: OrderStatus::Pending,
            tx_ref: Some(generate_tx_ref(TX_REF_PREFIX)),
            code,
            paid_at: None,
        },
    )
    .await?;
    let tx_ref = order.tx_ref.clone().unwrap_or_default();

    let started = match gateway {
        Gateway::Chapa => start_chapa(&state, &order, &course, &buyer).await,
        Gateway::Stripe => start_stripe(&state, &order, &course, &buyer).await,
    };
    let checkout_url = match started {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(order_id = order.id, gateway = gateway.as_str(), error = %e, "Checkout failed");
            // The pending order would never settle; close it.
            if let Err(close) = apply_status(&state, &order, OrderStatus::Failed, None).await {
                tracing::error!(order_id = order.id, error = %close, "Failed to close order");
            }
            return Err(e);
        }
    };

    tracing::info!(
        order_id = order.id,
        course_id,
        user_id = buyer.id,
        gateway = gateway.as_str(),
        "Checkout started"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CheckoutResponse {
                order_id: order.id,
                tx_ref,
                gateway,
                checkout_url,
            },
        }),
    ))
}

/// Normalize and check an affiliate code. Buyers cannot use their own code.
async fn resolve_referral_code(
    state: &AppState,
    buyer: &User,
    code: Option<&str>,
) -> AppResult<Option<String>> {
    let Some(code) = code.map(normalize_referral_code).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    validate_referral_code(&code)?;

    let owner = UserRepo::find_by_referral_code(&state.pool, &code)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Unknown referral code '{code}'")))
        })?;
    if owner.id == buyer.id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot use your own referral code".into(),
        )));
    }
    Ok(Some(code))
}

fn gateway_unavailable(gateway: Gateway) -> AppError {
    AppError::Core(CoreError::Validation(format!(
        "Payments through {} are not available",
        gateway.as_str()
    )))
}

async fn start_chapa(
    state: &AppState,
    order: &Order,
    course: &Course,
    buyer: &User,
) -> AppResult<String> {
    let client = state
        .chapa
        .as_ref()
        .ok_or_else(|| gateway_unavailable(Gateway::Chapa))?;
    let base = &state.config.public_base_url;
    let request = chapa::CheckoutRequest {
        tx_ref: order.tx_ref.clone().unwrap_or_default(),
        amount: order.amount,
        email: buyer.email.clone(),
        full_name: buyer.full_name.clone(),
        phone_number: buyer.phone.clone(),
        callback_url: format!("{base}/api/v1/webhooks/chapa"),
        return_url: format!("{base}/courses/{}?order={}", course.id, order.id),
        title: course.title.clone(),
    };
    Ok(client.initialize(&request).await?)
}

async fn start_stripe(
    state: &AppState,
    order: &Order,
    course: &Course,
    buyer: &User,
) -> AppResult<String> {
    let client = state
        .stripe
        .as_ref()
        .ok_or_else(|| gateway_unavailable(Gateway::Stripe))?;
    let base = &state.config.public_base_url;
    let request = stripe::CheckoutRequest {
        tx_ref: order.tx_ref.clone().unwrap_or_default(),
        amount: order.amount,
        product_name: course.title.clone(),
        customer_email: Some(buyer.email.clone()),
        success_url: format!("{base}/courses/{}?order={}&status=success", course.id, order.id),
        cancel_url: format!("{base}/courses/{}?order={}&status=cancelled", course.id, order.id),
    };
    let session = client.create_checkout_session(&request).await?;
    match session.url {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(StripeError::MissingUrl(session.id).into()),
    }
}

/// GET /api/v1/me/orders
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let orders = OrderRepo::list_by_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// POST /api/v1/me/orders/{id}/verify
///
/// Ask Chapa for the transaction status when the buyer returns before the
/// webhook arrives. Stripe orders are settled by webhook only.
pub async fn verify_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Order>>> {
    let order = OrderRepo::find_by_id(&state.pool, order_id)
        .await?
        .filter(|o| o.user_id == user.user_id)
        .ok_or_else(|| CoreError::not_found("Order", order_id))?;

    if order.order_status() != Some(OrderStatus::Pending) || order.currency != Currency::Etb.code() {
        return Ok(Json(DataResponse { data: order }));
    }
    let Some(tx_ref) = order.tx_ref.clone() else {
        return Ok(Json(DataResponse { data: order }));
    };
    let client = state
        .chapa
        .as_ref()
        .ok_or_else(|| gateway_unavailable(Gateway::Chapa))?;

    let transaction = client.verify(&tx_ref).await?;
    if !transaction.is_success() {
        return Ok(Json(DataResponse { data: order }));
    }
    if transaction.amount_minor().is_some_and(|paid| paid < order.amount) {
        tracing::warn!(order_id, tx_ref = %tx_ref, "Chapa reports an amount below the order total");
        return Err(AppError::Core(CoreError::Conflict(
            "Paid amount does not match the order".into(),
        )));
    }

    let change = apply_status(
        &state,
        &order,
        OrderStatus::Paid,
        transaction.reference.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse { data: change.order }))
}
