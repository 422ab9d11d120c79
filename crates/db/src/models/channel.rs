//! Telegram channel and channel membership models.

use coursely_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A channel row from the `channels` table; one per course at most.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Channel {
    pub id: DbId,
    pub course_id: DbId,
    pub telegram_chat_id: i64,
    pub title: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateChannel {
    pub course_id: DbId,
    pub telegram_chat_id: i64,
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateChannel {
    pub telegram_chat_id: Option<i64>,
    pub title: Option<String>,
}

/// Membership status values stored in `channel_members.status`.
pub const MEMBER_INVITED: &str = "invited";
pub const MEMBER_JOINED: &str = "joined";
pub const MEMBER_BANNED: &str = "banned";

/// A membership row from the `channel_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChannelMember {
    pub id: DbId,
    pub channel_id: DbId,
    pub user_id: DbId,
    pub telegram_user_id: i64,
    pub invite_link: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
