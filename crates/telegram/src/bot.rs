//! Channel-gating bot.
//!
//! [`Bot`] long-polls the Bot API and answers private-chat commands.
//! Students link their Telegram account with a one-time code issued by the
//! API, then `/join` issues a single-use invite link per paid course that
//! has a channel. An outstanding link is handed out again rather than
//! minting another one. Membership
//! changes reported by Telegram are mirrored into `channel_members`, and
//! [`revoke_access`] bans a member when their order is refunded.

use std::sync::Arc;
use std::time::Duration;

use coursely_core::link_codes::{hash_link_code, is_link_code};
use coursely_core::types::DbId;
use coursely_db::models::channel::{MEMBER_BANNED, MEMBER_INVITED, MEMBER_JOINED};
use coursely_db::repositories::{ChannelRepo, OrderRepo, TelegramLinkRepo, UserRepo};
use coursely_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::client::{TelegramClient, TelegramError};
use crate::commands::{parse_command, Command, HELP_TEXT};
use crate::types::{ChatMemberUpdated, Message, Update};

/// Long-poll timeout passed to `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(5);

const INVALID_CODE: &str =
    "That link code is invalid or has expired. Create a new one in your Coursely profile.";

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Telegram(#[from] TelegramError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Bot
// ---------------------------------------------------------------------------

pub struct Bot {
    client: Arc<TelegramClient>,
    pool: DbPool,
}

impl Bot {
    pub fn new(client: Arc<TelegramClient>, pool: DbPool) -> Self {
        Self { client, pool }
    }

    /// Run the polling loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut offset: Option<i64> = None;
        tracing::info!("Telegram bot started");

        loop {
            let updates = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Telegram bot cancelled");
                    break;
                }
                result = self.client.get_updates(offset, POLL_TIMEOUT_SECS) => result,
            };

            match updates {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        if let Err(e) = self.handle_update(&update).await {
                            tracing::error!(update_id = update.update_id, error = %e, "Failed to handle update");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed, retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }
    }

    pub async fn handle_update(&self, update: &Update) -> Result<(), BotError> {
        if let Some(message) = &update.message {
            self.handle_message(message).await?;
        }
        if let Some(change) = &update.chat_member {
            self.handle_member_change(change).await?;
        }
        Ok(())
    }

    async fn handle_message(&self, message: &Message) -> Result<(), BotError> {
        let (Some(from), Some(text)) = (&message.from, &message.text) else {
            return Ok(());
        };
        if !message.chat.is_private() || from.is_bot {
            return Ok(());
        }
        let Some(command) = parse_command(text) else {
            return Ok(());
        };

        let reply = self.handle_command(from.id, command).await?;
        self.client.send_message(message.chat.id, &reply).await?;
        Ok(())
    }

    /// Execute a command for Telegram user `tg_user_id` and return the reply.
    pub async fn handle_command(
        &self,
        tg_user_id: i64,
        command: Command,
    ) -> Result<String, BotError> {
        match command {
            Command::Start | Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Link(code) => self.link(tg_user_id, &code).await,
            Command::Join => self.join(tg_user_id).await,
            Command::Status => self.status(tg_user_id).await,
            Command::Unknown(name) => Ok(format!("Unknown command /{name}. Send /help.")),
        }
    }

    async fn link(&self, tg_user_id: i64, code: &str) -> Result<String, BotError> {
        if code.is_empty() {
            return Ok("Usage: /link <code>. Create a code in your Coursely profile.".to_string());
        }

        if let Some(existing) = UserRepo::find_by_telegram_id(&self.pool, tg_user_id).await? {
            return Ok(format!("This Telegram account is already linked to {}.", existing.email));
        }

        if !is_link_code(code) {
            return Ok(INVALID_CODE.to_string());
        }
        let Some(user_id) = TelegramLinkRepo::redeem(&self.pool, &hash_link_code(code)).await?
        else {
            return Ok(INVALID_CODE.to_string());
        };
        let Some(user) = UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .filter(|u| u.is_active)
        else {
            return Ok(INVALID_CODE.to_string());
        };

        if !UserRepo::link_telegram(&self.pool, user.id, tg_user_id).await? {
            return Ok("That Coursely account is already linked to a different Telegram account.".to_string());
        }

        tracing::info!(user_id = user.id, tg_user_id, "Telegram account linked");
        Ok(format!("Linked to {}. Send /join to get your channel invites.", user.email))
    }

    async fn join(&self, tg_user_id: i64) -> Result<String, BotError> {
        let Some(user) = UserRepo::find_by_telegram_id(&self.pool, tg_user_id).await? else {
            return Ok("Link your account first with /link <code>.".to_string());
        };

        let channels = ChannelRepo::list_for_paid_courses(&self.pool, user.id).await?;
        if channels.is_empty() {
            return Ok("None of your courses has a Telegram channel yet.".to_string());
        }

        let mut lines = Vec::with_capacity(channels.len());
        for channel in &channels {
            let member = ChannelRepo::find_member(&self.pool, channel.id, user.id).await?;
            if let Some(member) = &member {
                match (member.status.as_str(), member.invite_link.as_deref()) {
                    (MEMBER_JOINED, _) => {
                        lines.push(format!("{}: already a member", channel.title));
                        continue;
                    }
                    // One outstanding link per member and channel.
                    (MEMBER_INVITED, Some(link)) => {
                        lines.push(format!("{}: {link}", channel.title));
                        continue;
                    }
                    (MEMBER_BANNED, _) => {
                        // Re-purchased after a refund.
                        self.client
                            .unban_chat_member(channel.telegram_chat_id, tg_user_id)
                            .await?;
                    }
                    _ => {}
                }
            }

            let name = format!("c{}-u{}", channel.course_id, user.id);
            let link = self
                .client
                .create_chat_invite_link(channel.telegram_chat_id, &name)
                .await?;
            ChannelRepo::upsert_member(
                &self.pool,
                channel.id,
                user.id,
                tg_user_id,
                Some(&link),
                MEMBER_INVITED,
            )
            .await?;
            lines.push(format!("{}: {link}", channel.title));
        }

        tracing::info!(user_id = user.id, channels = channels.len(), "Issued channel invites");
        Ok(lines.join("\n"))
    }

    async fn status(&self, tg_user_id: i64) -> Result<String, BotError> {
        let Some(user) = UserRepo::find_by_telegram_id(&self.pool, tg_user_id).await? else {
            return Ok("Not linked. Use /link <code>.".to_string());
        };

        let channels = ChannelRepo::list_for_paid_courses(&self.pool, user.id).await?;
        let mut lines = vec![format!("Linked to {} ({}).", user.full_name, user.email)];
        for channel in &channels {
            let status = ChannelRepo::find_member(&self.pool, channel.id, user.id)
                .await?
                .map_or_else(|| "not invited".to_string(), |m| m.status);
            lines.push(format!("{}: {status}", channel.title));
        }
        Ok(lines.join("\n"))
    }

    async fn handle_member_change(&self, change: &ChatMemberUpdated) -> Result<(), BotError> {
        let status = match change.new_chat_member.status.as_str() {
            "member" | "administrator" | "creator" => MEMBER_JOINED,
            "kicked" => MEMBER_BANNED,
            _ => return Ok(()),
        };
        let updated = ChannelRepo::set_member_status_by_telegram(
            &self.pool,
            change.chat.id,
            change.new_chat_member.user.id,
            status,
        )
        .await?;
        if updated {
            tracing::debug!(
                chat_id = change.chat.id,
                tg_user_id = change.new_chat_member.user.id,
                status,
                "Channel membership updated"
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Revocation
// ---------------------------------------------------------------------------

/// Ban `user_id` from the channel of `course_id` once they no longer own it.
///
/// An unused invite link is revoked first so it cannot be passed on.
///
/// Returns `true` when a ban was issued. Users with another paid order for
/// the course, or without a membership row, are left alone.
pub async fn revoke_access(
    client: &TelegramClient,
    pool: &DbPool,
    user_id: DbId,
    course_id: DbId,
) -> Result<bool, BotError> {
    if OrderRepo::has_paid(pool, user_id, course_id).await? {
        return Ok(false);
    }
    let Some(channel) = ChannelRepo::find_by_course(pool, course_id).await? else {
        return Ok(false);
    };
    let Some(member) = ChannelRepo::find_member(pool, channel.id, user_id).await? else {
        return Ok(false);
    };
    if member.status == MEMBER_BANNED {
        return Ok(false);
    }

    if let (MEMBER_INVITED, Some(link)) = (member.status.as_str(), member.invite_link.as_deref()) {
        client
            .revoke_chat_invite_link(channel.telegram_chat_id, link)
            .await?;
    }
    client
        .ban_chat_member(channel.telegram_chat_id, member.telegram_user_id)
        .await?;
    ChannelRepo::upsert_member(
        pool,
        channel.id,
        user_id,
        member.telegram_user_id,
        None,
        MEMBER_BANNED,
    )
    .await?;

    tracing::info!(user_id, course_id, "Channel access revoked");
    Ok(true)
}
