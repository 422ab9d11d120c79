use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursely_api::config::ServerConfig;
use coursely_api::router::build_app_router;
use coursely_api::state::AppState;
use coursely_telegram::Bot;

const DEFAULT_LOG_FILTER: &str =
    "coursely_api=debug,coursely_payments=info,coursely_telegram=debug,coursely_db=info,tower_http=debug";

/// How long the bot gets to finish its current poll after shutdown starts.
const BOT_STOP_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        public_base_url = %config.public_base_url,
        chapa = config.chapa.is_some(),
        stripe = config.stripe.is_some(),
        telegram = config.telegram_bot_token.is_some(),
        "Loaded server configuration"
    );

    let pool = connect_database().await;
    let state = AppState::new(pool.clone(), config.clone());

    let bot_cancel = CancellationToken::new();
    let bot = spawn_bot(&state, pool, bot_cancel.clone());

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Cannot bind {addr}: {e}"));
    tracing::info!(%addr, "Coursely API listening");

    axum::serve(listener, build_app_router(state, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("HTTP server stopped");
    bot_cancel.cancel();
    if let Some(handle) = bot {
        match tokio::time::timeout(BOT_STOP_GRACE, handle).await {
            Ok(Ok(())) => tracing::info!("Telegram bot stopped"),
            Ok(Err(e)) => tracing::error!(error = %e, "Telegram bot task failed"),
            Err(_) => tracing::warn!("Telegram bot did not stop in time"),
        }
    }
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, verify and migrate. Any failure aborts startup.
async fn connect_database() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = coursely_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    coursely_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    coursely_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");
    pool
}

/// Start the long-polling bot when a token is configured.
fn spawn_bot(state: &AppState, pool: PgPool, cancel: CancellationToken) -> Option<JoinHandle<()>> {
    let Some(client) = state.telegram.as_ref() else {
        tracing::info!("TELEGRAM_BOT_TOKEN not set, bot disabled");
        return None;
    };
    let bot = Bot::new(Arc::clone(client), pool);
    Some(tokio::spawn(async move { bot.run(cancel).await }))
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
