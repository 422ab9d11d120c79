use std::sync::Arc;

use coursely_payments::{ChapaClient, StripeClient};
use coursely_telegram::TelegramClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: coursely_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Chapa client, present when Chapa is configured.
    pub chapa: Option<Arc<ChapaClient>>,
    /// Stripe client, present when Stripe is configured.
    pub stripe: Option<Arc<StripeClient>>,
    /// Telegram client, present when a bot token is configured.
    pub telegram: Option<Arc<TelegramClient>>,
}

impl AppState {
    /// Build state with gateway clients created from `config`.
    pub fn new(pool: coursely_db::DbPool, config: ServerConfig) -> Self {
        let chapa = config
            .chapa
            .as_ref()
            .map(|c| Arc::new(ChapaClient::new(c.secret_key.clone())));
        let stripe = config
            .stripe
            .as_ref()
            .map(|c| Arc::new(StripeClient::new(c.secret_key.clone())));
        let telegram = config
            .telegram_bot_token
            .as_deref()
            .map(|token| Arc::new(TelegramClient::new(token)));

        Self {
            pool,
            config: Arc::new(config),
            chapa,
            stripe,
            telegram,
        }
    }
}
