//! Inputs for the sales reports.

use coursely_core::payments::Currency;
use coursely_core::reporting::DateRange;
use coursely_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Which paid orders a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    /// Every order on the platform.
    All,
    /// Orders for courses taught by this instructor.
    Instructor(DbId),
    /// Offline sales recorded by this seller plus online sales that used
    /// their referral code.
    Reseller {
        seller_id: DbId,
        referral_code: Option<String>,
    },
}

/// Parameters for loading order facts.
#[derive(Debug, Clone)]
pub struct FactQuery {
    pub currency: Currency,
    pub range: DateRange,
    pub scope: ReportScope,
}

/// `id -> display name` pair used to label report rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NamedId {
    pub id: DbId,
    pub name: String,
}

/// `referral code -> owner` pair used to label affiliate rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CodeOwner {
    pub code: String,
    pub user_id: DbId,
    pub name: String,
}
