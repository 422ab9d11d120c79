//! Loads paid orders for the sales reports.
//!
//! Aggregation lives in `coursely_core::reporting`; this repository only
//! selects the rows in scope and maps them to [`OrderFact`]s.

use chrono::{Days, NaiveDate, NaiveTime};
use coursely_core::reporting::OrderFact;
use coursely_core::types::{DbId, MinorUnits, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::models::report::{CodeOwner, FactQuery, NamedId, ReportScope};

#[derive(Debug, FromRow)]
struct FactRow {
    order_id: DbId,
    course_id: DbId,
    seller_id: Option<DbId>,
    tx_ref: Option<String>,
    code: Option<String>,
    amount: MinorUnits,
    occurred_at: Timestamp,
}

impl From<FactRow> for OrderFact {
    fn from(row: FactRow) -> Self {
        OrderFact {
            order_id: row.order_id,
            course_id: row.course_id,
            seller_id: row.seller_id,
            tx_ref: row.tx_ref,
            code: row.code,
            amount: row.amount,
            occurred_at: row.occurred_at,
        }
    }
}

fn start_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub struct ReportRepo;

impl ReportRepo {
    /// Paid orders in `query.currency` whose sale date falls in
    /// `query.range` (inclusive, UTC), restricted to `query.scope`.
    ///
    /// The sale date is `paid_at`, falling back to `created_at`.
    pub async fn load_facts(pool: &PgPool, query: &FactQuery) -> Result<Vec<OrderFact>, sqlx::Error> {
        let from = start_of_day(query.range.start);
        let until = start_of_day(
            query
                .range
                .end
                .checked_add_days(Days::new(1))
                .unwrap_or(query.range.end),
        );

        let (instructor_id, seller_id, referral_code) = match &query.scope {
            ReportScope::All => (None, None, None),
            ReportScope::Instructor(id) => (Some(*id), None, None),
            ReportScope::Reseller {
                seller_id,
                referral_code,
            } => (
                None,
                Some(*seller_id),
                referral_code.as_deref().map(|c| c.trim().to_uppercase()),
            ),
        };

        let rows = sqlx::query_as::<_, FactRow>(
            "SELECT o.id AS order_id, o.course_id, o.seller_id, o.tx_ref, o.code, o.amount,
                    COALESCE(o.paid_at, o.created_at) AS occurred_at
             FROM orders o
             JOIN courses c ON c.id = o.course_id
             WHERE o.status = 'paid'
               AND o.currency = $1
               AND COALESCE(o.paid_at, o.created_at) >= $2
               AND COALESCE(o.paid_at, o.created_at) < $3
               AND ($4::BIGINT IS NULL OR c.instructor_id = $4)
               AND ($5::BIGINT IS NULL
                    OR o.seller_id = $5
                    OR ($6::TEXT IS NOT NULL AND o.tx_ref IS NOT NULL AND UPPER(TRIM(o.code)) = $6))
             ORDER BY occurred_at, o.id",
        )
        .bind(query.currency.code())
        .bind(from)
        .bind(until)
        .bind(instructor_id)
        .bind(seller_id)
        .bind(referral_code)
        .fetch_all(pool)
        .await?;

        tracing::debug!(
            count = rows.len(),
            currency = query.currency.code(),
            start = %query.range.start,
            end = %query.range.end,
            "Loaded order facts"
        );
        Ok(rows.into_iter().map(OrderFact::from).collect())
    }

    /// Display names for seller accounts.
    pub async fn seller_names(pool: &PgPool, ids: &[DbId]) -> Result<Vec<NamedId>, sqlx::Error> {
        sqlx::query_as::<_, NamedId>("SELECT id, full_name AS name FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Owners of the given (upper-cased) referral codes.
    pub async fn code_owners(pool: &PgPool, codes: &[String]) -> Result<Vec<CodeOwner>, sqlx::Error> {
        sqlx::query_as::<_, CodeOwner>(
            "SELECT referral_code AS code, id AS user_id, full_name AS name
             FROM users WHERE referral_code = ANY($1)",
        )
        .bind(codes)
        .fetch_all(pool)
        .await
    }
}
