//! Repository for `telegram_link_codes`.

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::telegram_link::TelegramLinkCode;

const COLUMNS: &str = "id, user_id, code_hash, expires_at, used_at, created_at, updated_at";

pub struct TelegramLinkRepo;

impl TelegramLinkRepo {
    /// Store a new code for `user_id`, valid for `ttl_mins`.
    ///
    /// Earlier unused codes of the same user are dropped, so only the
    /// newest one can be redeemed.
    pub async fn issue(
        pool: &PgPool,
        user_id: DbId,
        code_hash: &str,
        ttl_mins: i32,
    ) -> Result<TelegramLinkCode, sqlx::Error> {
        let query = format!(
            "WITH dropped AS (
                DELETE FROM telegram_link_codes WHERE user_id = $1 AND used_at IS NULL
             )
             INSERT INTO telegram_link_codes (user_id, code_hash, expires_at)
             VALUES ($1, $2, NOW() + make_interval(mins => $3))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TelegramLinkCode>(&query)
            .bind(user_id)
            .bind(code_hash)
            .bind(ttl_mins)
            .fetch_one(pool)
            .await
    }

    /// Mark an unexpired, unused code as used and return its owner.
    ///
    /// Two concurrent redemptions of one code cannot both succeed.
    pub async fn redeem(pool: &PgPool, code_hash: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE telegram_link_codes SET used_at = NOW()
             WHERE code_hash = $1 AND used_at IS NULL AND expires_at > NOW()
             RETURNING user_id",
        )
        .bind(code_hash)
        .fetch_optional(pool)
        .await
    }
}
