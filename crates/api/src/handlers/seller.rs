//! Seller endpoints: record offline sales and view commission.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use coursely_core::commission::Rates;
use coursely_core::error::CoreError;
use coursely_core::payments::{Currency, OrderStatus};
use coursely_core::reporting::{build_overview, summarize_resellers, Overview};
use coursely_core::types::{DbId, MinorUnits};
use coursely_core::validation::validate_price;
use coursely_db::models::order::{CreateOrder, Order};
use coursely_db::models::report::ReportScope;
use coursely_db::repositories::{IncomeRateRepo, OrderRepo, UserRepo};
use serde::{Deserialize, Serialize};

use super::reports::{label_resellers, load_report, ReportParams, SellerRow};
use crate::error::{AppError, AppResult};
use crate::guards::find_course;
use crate::middleware::rbac::RequireSeller;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordSaleRequest {
    pub course_id: DbId,
    pub buyer_email: String,
    pub currency: String,
    /// Defaults to the course list price in `currency`.
    pub amount: Option<MinorUnits>,
}

/// POST /api/v1/seller/sales
///
/// Record a sale the seller collected offline. The order is created as
/// paid with the seller attached and no gateway reference, which is what
/// marks it as a seller sale in the reports.
pub async fn record_sale(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Json(input): Json<RecordSaleRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Order>>)> {
    let currency = Currency::parse(&input.currency)?;
    let course = find_course(&state, input.course_id).await?;
    if !course.is_published {
        return Err(AppError::Core(CoreError::Validation(
            "Only published courses can be sold".into(),
        )));
    }

    let email = input.buyer_email.trim().to_lowercase();
    let buyer = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("No active account uses '{email}'")))
        })?;
    if buyer.id == seller.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Sellers cannot sell to themselves".into(),
        )));
    }
    if OrderRepo::has_paid(&state.pool, buyer.id, course.id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "The buyer already owns this course".into(),
        )));
    }

    let list_price = match currency {
        Currency::Etb => course.price_etb,
        Currency::Usd => course.price_usd,
    };
    let amount = input.amount.unwrap_or(list_price);
    validate_price("amount", amount)?;
    if amount == 0 {
        return Err(AppError::Core(CoreError::Validation(format!(
            "This course is not sold in {}",
            currency.code()
        ))));
    }

    let order = OrderRepo::create(
        &state.pool,
        &CreateOrder {
            user_id: buyer.id,
            course_id: course.id,
            seller_id: Some(seller.user_id),
            currency: currency.code().to_string(),
            amount,
            status: OrderStatus::Paid,
            tx_ref: None,
            code: None,
            paid_at: Some(Utc::now()),
        },
    )
    .await?;

    tracing::info!(
        order_id = order.id,
        seller_id = seller.user_id,
        buyer_id = buyer.id,
        course_id = course.id,
        "Offline sale recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// GET /api/v1/seller/sales
pub async fn list_sales(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let (limit, offset) = params.resolve();
    let orders = OrderRepo::list_by_seller(&state.pool, seller.user_id, limit, offset).await?;
    Ok(Json(DataResponse { data: orders }))
}

#[derive(Debug, Serialize)]
pub struct SellerOverview {
    pub currency: Currency,
    pub referral_code: Option<String>,
    pub rates: Rates,
    /// Commission earned in range across both channels.
    pub commission: MinorUnits,
    pub overview: Overview,
    /// One row for offline sales and one for referral-code sales.
    pub channels: Vec<SellerRow>,
}

/// GET /api/v1/seller/overview
///
/// Sales the caller made directly plus gateway sales that used their
/// referral code.
pub async fn overview(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<SellerOverview>>> {
    let account = UserRepo::find_by_id(&state.pool, seller.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", seller.user_id))?;
    let scope = ReportScope::Reseller {
        seller_id: account.id,
        referral_code: account.referral_code.clone(),
    };
    let (window, facts) = load_report(&state, &params, scope).await?;
    let rates = IncomeRateRepo::current(&state.pool).await?;

    let overview = build_overview(&facts, &window.range, window.granularity, window.today);
    let rows = summarize_resellers(&facts, &window.range, &rates, window.today);
    let commission = rows.iter().map(|r| r.commission).sum();
    let channels = label_resellers(&state, rows).await?;

    Ok(Json(DataResponse {
        data: SellerOverview {
            currency: window.currency,
            referral_code: account.referral_code,
            rates,
            commission,
            overview,
            channels,
        },
    }))
}
