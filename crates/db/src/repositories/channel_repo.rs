//! Repository for Telegram `channels` and `channel_members`.

use coursely_core::types::DbId;
use sqlx::PgPool;

use crate::models::channel::{Channel, ChannelMember, CreateChannel, UpdateChannel};

const COLUMNS: &str = "id, course_id, telegram_chat_id, title, created_at, updated_at";

const MEMBER_COLUMNS: &str = "id, channel_id, user_id, telegram_user_id, invite_link, status, \
                              created_at, updated_at";

pub struct ChannelRepo;

impl ChannelRepo {
    pub async fn create(pool: &PgPool, input: &CreateChannel) -> Result<Channel, sqlx::Error> {
        let query = format!(
            "INSERT INTO channels (course_id, telegram_chat_id, title)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Channel>(&query)
            .bind(input.course_id)
            .bind(input.telegram_chat_id)
            .bind(input.title.trim())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Channel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM channels WHERE id = $1");
        sqlx::query_as::<_, Channel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Option<Channel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM channels WHERE course_id = $1");
        sqlx::query_as::<_, Channel>(&query)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Channel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM channels ORDER BY id");
        sqlx::query_as::<_, Channel>(&query).fetch_all(pool).await
    }

    /// Channels of every course the user has a paid order for.
    pub async fn list_for_paid_courses(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Channel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM channels
             WHERE course_id IN (
                SELECT course_id FROM orders WHERE user_id = $1 AND status = 'paid'
             )
             ORDER BY id"
        );
        sqlx::query_as::<_, Channel>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateChannel,
    ) -> Result<Option<Channel>, sqlx::Error> {
        let query = format!(
            "UPDATE channels SET
                telegram_chat_id = COALESCE($2, telegram_chat_id),
                title = COALESCE($3, title)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Channel>(&query)
            .bind(id)
            .bind(input.telegram_chat_id)
            .bind(input.title.as_deref().map(str::trim))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM channels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- Members -------------------------------------------------------------

    pub async fn find_member(
        pool: &PgPool,
        channel_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ChannelMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM channel_members WHERE channel_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, ChannelMember>(&query)
            .bind(channel_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_members(
        pool: &PgPool,
        channel_id: DbId,
    ) -> Result<Vec<ChannelMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM channel_members WHERE channel_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, ChannelMember>(&query)
            .bind(channel_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or refresh a membership row.
    pub async fn upsert_member(
        pool: &PgPool,
        channel_id: DbId,
        user_id: DbId,
        telegram_user_id: i64,
        invite_link: Option<&str>,
        status: &str,
    ) -> Result<ChannelMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO channel_members (channel_id, user_id, telegram_user_id, invite_link, status)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_channel_members_channel_user DO UPDATE
             SET telegram_user_id = EXCLUDED.telegram_user_id,
                 invite_link = COALESCE(EXCLUDED.invite_link, channel_members.invite_link),
                 status = EXCLUDED.status
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, ChannelMember>(&query)
            .bind(channel_id)
            .bind(user_id)
            .bind(telegram_user_id)
            .bind(invite_link)
            .bind(status)
            .fetch_one(pool)
            .await
    }

    /// Set a member's status by Telegram identity. Returns `true` if a row changed.
    pub async fn set_member_status_by_telegram(
        pool: &PgPool,
        telegram_chat_id: i64,
        telegram_user_id: i64,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE channel_members m SET status = $3
             FROM channels c
             WHERE c.id = m.channel_id
               AND c.telegram_chat_id = $1
               AND m.telegram_user_id = $2
               AND m.status <> $3",
        )
        .bind(telegram_chat_id)
        .bind(telegram_user_id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
