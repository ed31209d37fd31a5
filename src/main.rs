mod bot;
mod commands;
mod config;
mod message_log;
mod platform;
mod presence;
mod scheduler;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::{AppState, BotIdentity};
use crate::config::Config;
use crate::platform::telegram::TelegramPlatform;
use crate::scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chanwatch=debug".into()),
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
    info!("  Target chat: {:?}", config.presence.target_chat_id);
    info!("  Notify user: {:?}", config.presence.notification_user_id);
    info!("  Check interval: {}s", config.presence.min_interval_secs);
    info!("  Message logs: {}", config.storage.log_directory.display());

    let bot = Bot::new(&config.telegram.bot_token);
    let me = bot.get_me().await.context("Failed to authorize with Telegram")?;
    let identity = BotIdentity {
        user_id: me.user.id,
        username: me.username().to_string(),
    };
    info!("Authorized as @{}", identity.username);

    let timer_period = Duration::from_secs(config.presence.timer_secs);
    let platform = Arc::new(TelegramPlatform::new(bot.clone()));
    let state = Arc::new(AppState::new(config, platform, identity));

    // Presence check timer, independent of incoming updates
    let scheduler = Scheduler::new().await?;
    scheduler::tasks::register_presence_check(&scheduler, state.clone(), timer_period).await?;
    scheduler.start().await?;

    info!("Bot is starting...");
    platform::telegram::run(state, bot).await?;

    Ok(())
}
