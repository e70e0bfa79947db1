use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use salon_booking::bot;
use salon_booking::config::AppConfig;
use salon_booking::db;
use salon_booking::handlers;
use salon_booking::services::messaging::telegram::TelegramClient;
use salon_booking::services::messaging::MessagingProvider;
use salon_booking::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = db::init_store(config.data_dir.clone()).await?;
    tracing::info!("data directory: {}", store.dir().display());

    if config.bot_token.is_empty() {
        tracing::warn!("BOT_TOKEN is not set, Telegram delivery will fail");
    }
    if config.admin_ids.is_empty() {
        tracing::warn!("ADMIN_IDS is empty, booking notifications have no recipients");
    }

    let telegram = Arc::new(TelegramClient::new(
        config.telegram_api_url.clone(),
        config.bot_token.clone(),
    ));
    let messaging: Arc<dyn MessagingProvider> = telegram.clone();

    let state = Arc::new(AppState::new(store, config.clone(), messaging));

    if !config.bot_token.is_empty() && config.bot_polling {
        tokio::spawn(bot::run(Arc::clone(&state), telegram));
    } else {
        tracing::info!("bot polling disabled");
    }

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
