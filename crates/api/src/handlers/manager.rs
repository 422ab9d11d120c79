//! Manager administration: users, income rates, Telegram channels,
//! announcements and orders.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursely_core::commission::{validate_rates, Rates};
use coursely_core::error::CoreError;
use coursely_core::payments::OrderStatus;
use coursely_core::roles::Role;
use coursely_core::types::DbId;
use coursely_core::validation::{
    normalize_referral_code, validate_body, validate_referral_code, validate_text, validate_title,
};
use coursely_db::models::announcement::{Announcement, CreateAnnouncement};
use coursely_db::models::channel::{Channel, ChannelMember, CreateChannel, UpdateChannel};
use coursely_db::models::income_rate::UpdateIncomeRates;
use coursely_db::models::order::{Order, OrderListQuery};
use coursely_db::models::role::RoleSummary;
use coursely_db::models::user::{UpdateUser, UserListQuery, UserResponse};
use coursely_db::repositories::{
    AnnouncementRepo, ChannelRepo, IncomeRateRepo, OrderRepo, RoleRepo, SessionRepo, UserRepo,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::guards::find_course;
use crate::middleware::rbac::RequireManager;
use crate::orders::apply_status;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum length of a Telegram channel title.
const MAX_CHANNEL_TITLE_LEN: usize = 128;

fn not_found(entity: &'static str, id: DbId) -> AppError {
    CoreError::not_found(entity, id).into()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/manager/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Query(params): Query<UserListQuery>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (limit, offset) = page(params.limit, params.offset);
    let users = UserRepo::list(&state.pool, &params, limit, offset).await?;
    let data = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/manager/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
) -> AppResult<Json<DataResponse<Vec<RoleSummary>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// PUT /api/v1/manager/users/{id}
///
/// Change a user's name, phone, role, referral code or active flag.
pub async fn update_user(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(user_id): Path<DbId>,
    Json(mut input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(name) = &input.full_name {
        validate_text("full_name", name, 255)?;
    }
    if let Some(role_id) = input.role_id {
        if Role::from_id(role_id).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown role id {role_id}"
            ))));
        }
        if user_id == manager.user_id && role_id != Role::Manager.id() {
            return Err(AppError::Core(CoreError::Validation(
                "You cannot remove your own manager role".into(),
            )));
        }
    }
    if let Some(code) = input.referral_code.take() {
        let code = normalize_referral_code(&code);
        validate_referral_code(&code)?;
        input.referral_code = Some(code);
    }

    let user = UserRepo::update(&state.pool, user_id, &input)
        .await?
        .ok_or_else(|| not_found("User", user_id))?;
    if input.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    }
    tracing::info!(user_id, manager_id = manager.user_id, "User updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// DELETE /api/v1/manager/users/{id}
///
/// Deactivates the account and revokes its sessions; orders are kept.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if user_id == manager.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }
    if !UserRepo::deactivate(&state.pool, user_id).await? {
        return Err(not_found("User", user_id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, user_id).await?;
    tracing::info!(user_id, manager_id = manager.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Income rates
// ---------------------------------------------------------------------------

/// GET /api/v1/manager/income-rates
pub async fn get_income_rates(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
) -> AppResult<Json<DataResponse<Rates>>> {
    let rates = IncomeRateRepo::current(&state.pool).await?;
    Ok(Json(DataResponse { data: rates }))
}

/// PUT /api/v1/manager/income-rates
///
/// Omitted rates keep their current value. The merged table is validated
/// as a whole.
pub async fn update_income_rates(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Json(input): Json<UpdateIncomeRates>,
) -> AppResult<Json<DataResponse<Rates>>> {
    let current = IncomeRateRepo::current(&state.pool).await?;
    let rates = Rates {
        seller_bps: input.seller_bps.unwrap_or(current.seller_bps),
        affiliate_bps: input.affiliate_bps.unwrap_or(current.affiliate_bps),
        instructor_bps: input.instructor_bps.unwrap_or(current.instructor_bps),
    };
    validate_rates(&rates)?;

    IncomeRateRepo::save(&state.pool, &rates).await?;
    tracing::info!(
        manager_id = manager.user_id,
        seller_bps = rates.seller_bps,
        affiliate_bps = rates.affiliate_bps,
        instructor_bps = rates.instructor_bps,
        "Income rates updated"
    );
    Ok(Json(DataResponse { data: rates }))
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// A channel with its members.
#[derive(Debug, Serialize)]
pub struct ChannelDetail {
    #[serde(flatten)]
    pub channel: Channel,
    pub members: Vec<ChannelMember>,
}

/// GET /api/v1/manager/channels
pub async fn list_channels(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
) -> AppResult<Json<DataResponse<Vec<Channel>>>> {
    let channels = ChannelRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: channels }))
}

/// GET /api/v1/manager/channels/{id}
pub async fn get_channel(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(channel_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ChannelDetail>>> {
    let channel = ChannelRepo::find_by_id(&state.pool, channel_id)
        .await?
        .ok_or_else(|| not_found("Channel", channel_id))?;
    let members = ChannelRepo::list_members(&state.pool, channel_id).await?;
    Ok(Json(DataResponse {
        data: ChannelDetail { channel, members },
    }))
}

/// POST /api/v1/manager/channels
pub async fn create_channel(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(input): Json<CreateChannel>,
) -> AppResult<(StatusCode, Json<DataResponse<Channel>>)> {
    validate_text("title", &input.title, MAX_CHANNEL_TITLE_LEN)?;
    find_course(&state, input.course_id).await?;
    let channel = ChannelRepo::create(&state.pool, &input).await?;
    tracing::info!(channel_id = channel.id, course_id = channel.course_id, "Channel created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: channel })))
}

/// PUT /api/v1/manager/channels/{id}
pub async fn update_channel(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(channel_id): Path<DbId>,
    Json(input): Json<UpdateChannel>,
) -> AppResult<Json<DataResponse<Channel>>> {
    if let Some(title) = &input.title {
        validate_text("title", title, MAX_CHANNEL_TITLE_LEN)?;
    }
    let channel = ChannelRepo::update(&state.pool, channel_id, &input)
        .await?
        .ok_or_else(|| not_found("Channel", channel_id))?;
    Ok(Json(DataResponse { data: channel }))
}

/// DELETE /api/v1/manager/channels/{id}
pub async fn delete_channel(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(channel_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ChannelRepo::delete(&state.pool, channel_id).await? {
        return Err(not_found("Channel", channel_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Announcements
// ---------------------------------------------------------------------------

/// POST /api/v1/manager/announcements
///
/// Without `course_id` the announcement is platform-wide.
pub async fn create_announcement(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Json(input): Json<CreateAnnouncement>,
) -> AppResult<(StatusCode, Json<DataResponse<Announcement>>)> {
    validate_title(&input.title)?;
    validate_body(&input.body)?;
    if let Some(course_id) = input.course_id {
        find_course(&state, course_id).await?;
    }
    let announcement = AnnouncementRepo::create(&state.pool, manager.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: announcement })))
}

/// DELETE /api/v1/manager/announcements/{id}
pub async fn delete_announcement(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(announcement_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AnnouncementRepo::delete(&state.pool, announcement_id).await? {
        return Err(not_found("Announcement", announcement_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// GET /api/v1/manager/orders
pub async fn list_orders(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Query(params): Query<OrderListQuery>,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    if let Some(status) = params.status.as_deref() {
        if OrderStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown order status '{status}'"
            ))));
        }
    }
    let (limit, offset) = page(params.limit, params.offset);
    let orders = OrderRepo::list(&state.pool, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// POST /api/v1/manager/orders/{id}/refund
///
/// Marks a paid order refunded and revokes the buyer's channel access.
/// The money itself is returned through the gateway dashboard.
pub async fn refund_order(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(order_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Order>>> {
    let order = OrderRepo::find_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| not_found("Order", order_id))?;
    let change = apply_status(&state, &order, OrderStatus::Refunded, None).await?;
    if change.applied {
        tracing::info!(order_id, manager_id = manager.user_id, "Order refunded by manager");
    }
    Ok(Json(DataResponse { data: change.order }))
}
