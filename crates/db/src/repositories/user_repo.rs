//! Accounts of every role, plus the login bookkeeping used by `/auth`.

use coursely_core::search::like_pattern;
use coursely_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User, UserListQuery};

const COLUMNS: &str = "id, full_name, email, phone, password_hash, role_id, referral_code, \
                       telegram_user_id, is_active, failed_login_count, locked_until, \
                       last_login_at, created_at, updated_at";

fn select(filter: &str) -> String {
    format!("SELECT {COLUMNS} FROM users WHERE {filter}")
}

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (full_name, email, phone, password_hash, role_id, referral_code)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .bind(&input.referral_code)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&select("id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive; surrounding whitespace is ignored.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&select("LOWER(email) = LOWER($1)"))
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Codes are stored upper-cased; callers normalize before looking up.
    pub async fn find_by_referral_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&select("referral_code = $1"))
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_telegram_id(
        pool: &PgPool,
        telegram_user_id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&select("telegram_user_id = $1"))
            .bind(telegram_user_id)
            .fetch_optional(pool)
            .await
    }

    /// Newest first, optionally filtered by role and a name/email search.
    pub async fn list(
        pool: &PgPool,
        params: &UserListQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "{} ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
            select(
                "($1::BIGINT IS NULL OR role_id = $1)
                 AND ($2::TEXT IS NULL OR full_name ILIKE $2 OR email ILIKE $2)"
            )
        );
        let pattern = params
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);
        sqlx::query_as::<_, User>(&query)
            .bind(params.role_id)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply the `Some` fields of `input`; `None` when the user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                role_id = COALESCE($4, role_id),
                referral_code = COALESCE($5, referral_code),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(input.role_id)
            .bind(&input.referral_code)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// `false` when the user was already inactive or does not exist.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Bind a Telegram account to the user.
    ///
    /// `false` when the user is already bound to a different Telegram
    /// account. An account that belongs to another user fails with a
    /// `uq_users_telegram_user_id` violation.
    pub async fn link_telegram(
        pool: &PgPool,
        id: DbId,
        telegram_user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET telegram_user_id = $2
             WHERE id = $1 AND (telegram_user_id IS NULL OR telegram_user_id = $2)",
        )
        .bind(id)
        .bind(telegram_user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a failed password attempt. Reaching `max_attempts` locks the
    /// account for `lock_mins`; the new lock expiry is returned in that case.
    ///
    /// Counting and locking happen in one statement so concurrent attempts
    /// cannot both slip under the limit.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
        lock_mins: i32,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        let locked_until: Option<Option<Timestamp>> = sqlx::query_scalar(
            "UPDATE users SET
                failed_login_count = failed_login_count + 1,
                locked_until = CASE
                    WHEN failed_login_count + 1 >= $2 THEN NOW() + make_interval(mins => $3)
                    ELSE locked_until
                END
             WHERE id = $1
             RETURNING CASE WHEN failed_login_count >= $2 THEN locked_until END",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lock_mins)
        .fetch_optional(pool)
        .await?;
        Ok(locked_until.flatten())
    }

    /// Reset the failure counter, clear any lock and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
