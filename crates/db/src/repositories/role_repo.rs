//! Repository for the seeded `roles` lookup table.

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::RoleSummary;

const SUMMARY_SELECT: &str = "SELECT r.id, r.name, r.description,
            COUNT(u.id) FILTER (WHERE u.is_active) AS active_users
     FROM roles r
     LEFT JOIN users u ON u.role_id = r.id";

pub struct RoleRepo;

impl RoleRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RoleSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE r.id = $1 GROUP BY r.id");
        sqlx::query_as::<_, RoleSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every role with its active member count, by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<RoleSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} GROUP BY r.id ORDER BY r.id");
        sqlx::query_as::<_, RoleSummary>(&query).fetch_all(pool).await
    }
}
