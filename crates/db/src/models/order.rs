//! Order entity model and DTOs.

use coursely_core::payments::OrderStatus;
use coursely_core::types::{DbId, MinorUnits, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An order row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub seller_id: Option<DbId>,
    /// ISO code, `ETB` or `USD`.
    pub currency: String,
    pub amount: MinorUnits,
    pub status: String,
    pub tx_ref: Option<String>,
    pub code: Option<String>,
    pub gateway_reference: Option<String>,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Parsed status; rows are constrained by a CHECK so this is always `Some`.
    pub fn order_status(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status)
    }
}

/// DTO for inserting an order.
#[derive(Debug)]
pub struct CreateOrder {
    pub user_id: DbId,
    pub course_id: DbId,
    pub seller_id: Option<DbId>,
    pub currency: String,
    pub amount: MinorUnits,
    pub status: OrderStatus,
    pub tx_ref: Option<String>,
    pub code: Option<String>,
    pub paid_at: Option<Timestamp>,
}

/// Manager order list filters.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub course_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
