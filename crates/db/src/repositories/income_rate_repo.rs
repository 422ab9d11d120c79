//! Repository for the `income_rates` table.

use coursely_core::commission::{IncomeRateKind, Rates};
use sqlx::PgPool;

use crate::models::income_rate::IncomeRate;

const COLUMNS: &str = "id, kind, bps, created_at, updated_at";

pub struct IncomeRateRepo;

impl IncomeRateRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<IncomeRate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM income_rates ORDER BY kind");
        sqlx::query_as::<_, IncomeRate>(&query).fetch_all(pool).await
    }

    /// The active rate table. Missing kinds count as 0.
    pub async fn current(pool: &PgPool) -> Result<Rates, sqlx::Error> {
        let mut rates = Rates::default();
        for row in Self::list(pool).await? {
            match IncomeRateKind::parse(&row.kind) {
                Some(kind) => rates.set(kind, row.bps),
                None => tracing::warn!(kind = %row.kind, "Ignoring unknown income rate kind"),
            }
        }
        Ok(rates)
    }

    /// Replace the whole rate table in one transaction.
    pub async fn save(pool: &PgPool, rates: &Rates) -> Result<Vec<IncomeRate>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for kind in [
            IncomeRateKind::Seller,
            IncomeRateKind::Affiliate,
            IncomeRateKind::Instructor,
        ] {
            sqlx::query(
                "INSERT INTO income_rates (kind, bps) VALUES ($1, $2)
                 ON CONFLICT ON CONSTRAINT uq_income_rates_kind DO UPDATE SET bps = EXCLUDED.bps",
            )
            .bind(kind.as_str())
            .bind(rates.get(kind))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Self::list(pool).await
    }
}
