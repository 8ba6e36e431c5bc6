mod bot;
mod config;
mod platform;
mod storage;

use std::path::PathBuf;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::IngestionLoop;
use crate::config::Config;
use crate::platform::telegram::TelegramSource;
use crate::storage::FeedbackStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feedback_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Database: {}", config.storage.database_path.display());

    let store = FeedbackStore::open(&config.storage.database_path)?;
    info!("  Stored feedback: {}", store.count().await?);

    let bot = Bot::new(&config.telegram.bot_token);
    let me = bot
        .get_me()
        .await
        .context("Failed to authorize with Telegram")?;
    info!("Authorized on account {}", me.username());

    info!("Bot is starting...");
    let source = TelegramSource::spawn(bot);
    IngestionLoop::new(source, store).run().await;

    Ok(())
}
