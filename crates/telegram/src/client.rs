//! Telegram Bot API client.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::types::{ChatInviteLink, Update};

/// Production API root; the bot token is appended as `/bot<token>`.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Extra time on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE_SECS: u64 = 10;

/// HTTP client for the Telegram Bot API.
pub struct TelegramClient {
    client: reqwest::Client,
    /// `<root>/bot<token>`
    api_url: String,
}

/// Errors from the Bot API layer.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Telegram answered with `ok: false`.
    #[error("Telegram API error ({code}): {description}")]
    ApiError { code: i64, description: String },
}

/// The `{ ok, result, description, error_code }` response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, TELEGRAM_API_URL)
    }

    /// Point the client at a different API root (local Bot API server, tests).
    pub fn with_base_url(token: &str, root: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: format!("{}/bot{token}", root.trim_end_matches('/')),
        }
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "chat_member"],
        });
        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(std::time::Duration::from_secs(timeout_secs + POLL_GRACE_SECS))
            .json(&body)
            .send()
            .await?;
        Self::parse_envelope(response).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.call::<serde_json::Value>(
            "sendMessage",
            json!({ "chat_id": chat_id, "text": text, "disable_web_page_preview": true }),
        )
        .await
        .map(|_| ())
    }

    /// Create a single-use invite link for `chat_id`.
    pub async fn create_chat_invite_link(
        &self,
        chat_id: i64,
        name: &str,
    ) -> Result<String, TelegramError> {
        let link: ChatInviteLink = self
            .call(
                "createChatInviteLink",
                json!({ "chat_id": chat_id, "name": name, "member_limit": 1 }),
            )
            .await?;
        Ok(link.invite_link)
    }

    /// Invalidate an invite link that has not been used yet.
    pub async fn revoke_chat_invite_link(
        &self,
        chat_id: i64,
        invite_link: &str,
    ) -> Result<(), TelegramError> {
        self.call::<ChatInviteLink>(
            "revokeChatInviteLink",
            json!({ "chat_id": chat_id, "invite_link": invite_link }),
        )
        .await
        .map(|_| ())
    }

    pub async fn ban_chat_member(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError> {
        self.call::<bool>(
            "banChatMember",
            json!({ "chat_id": chat_id, "user_id": user_id, "revoke_messages": false }),
        )
        .await
        .map(|_| ())
    }

    /// Lift a ban so the user can join again through a new invite link.
    pub async fn unban_chat_member(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError> {
        self.call::<bool>(
            "unbanChatMember",
            json!({ "chat_id": chat_id, "user_id": user_id, "only_if_banned": true }),
        )
        .await
        .map(|_| ())
    }

    // ---- private helpers ----

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, TelegramError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;
        Self::parse_envelope(response).await
    }

    /// Telegram reports failures in the envelope, often with a 4xx status,
    /// so the body is parsed regardless of status.
    async fn parse_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TelegramError> {
        let status = response.status().as_u16();
        let envelope: Envelope<T> = response.json().await?;
        match (envelope.ok, envelope.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::ApiError {
                code: envelope.error_code.unwrap_or(i64::from(status)),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}
