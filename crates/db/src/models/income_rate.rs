//! Income rate model.

use coursely_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `income_rates` table. `bps` is in basis points.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IncomeRate {
    pub id: DbId,
    pub kind: String,
    pub bps: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body for replacing the rate table; omitted kinds keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIncomeRates {
    pub seller_bps: Option<i32>,
    pub affiliate_bps: Option<i32>,
    pub instructor_bps: Option<i32>,
}
