use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Externally reachable origin, used for gateway callback and return URLs.
    pub public_base_url: String,
    /// Chapa credentials; ETB checkout is disabled when absent.
    pub chapa: Option<GatewayConfig>,
    /// Stripe credentials; USD checkout is disabled when absent.
    pub stripe: Option<GatewayConfig>,
    /// Telegram bot token; the bot and access revocation are disabled when absent.
    pub telegram_bot_token: Option<String>,
}

/// API key plus webhook signing secret for one payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub secret_key: String,
    pub webhook_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `PUBLIC_BASE_URL`       | `http://localhost:3000`    |
    /// | `CHAPA_SECRET_KEY`      | unset                      |
    /// | `CHAPA_WEBHOOK_SECRET`  | unset                      |
    /// | `STRIPE_SECRET_KEY`     | unset                      |
    /// | `STRIPE_WEBHOOK_SECRET` | unset                      |
    /// | `TELEGRAM_BOT_TOKEN`    | unset                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            public_base_url,
            chapa: gateway_from_env("CHAPA"),
            stripe: gateway_from_env("STRIPE"),
            telegram_bot_token: optional_env("TELEGRAM_BOT_TOKEN"),
        }
    }
}

/// A non-empty environment variable, or `None`.
fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read `{PREFIX}_SECRET_KEY` and `{PREFIX}_WEBHOOK_SECRET`.
///
/// # Panics
///
/// Panics if only one of the two is set: a gateway that can create
/// payments but not verify their webhooks would never fulfil an order.
fn gateway_from_env(prefix: &str) -> Option<GatewayConfig> {
    let secret_key = optional_env(&format!("{prefix}_SECRET_KEY"));
    let webhook_secret = optional_env(&format!("{prefix}_WEBHOOK_SECRET"));
    match (secret_key, webhook_secret) {
        (Some(secret_key), Some(webhook_secret)) => Some(GatewayConfig {
            secret_key,
            webhook_secret,
        }),
        (None, None) => None,
        _ => panic!("{prefix}_SECRET_KEY and {prefix}_WEBHOOK_SECRET must be set together"),
    }
}
