mod auth;
mod commands;
mod config;
mod error;
mod logging;
mod platform;
mod router;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use teloxide::Bot;
use tracing::info;

use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::platform::telegram::{self, TelegramMessenger};
use crate::router::CommandRouter;

#[tokio::main]
async fn main() -> Result<()> {
    let started = Instant::now();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging
    logging::init(&config.logging)?;

    info!("Configuration loaded successfully");
    info!("  Admin ID: {}", config.admin_id.as_str());
    info!("  Log file: {}", config.logging.file.display());

    // Every command is registered before the first update is accepted.
    let mut registry = CommandRegistry::new();
    commands::general::register(&mut registry).context("Failed to register general commands")?;
    commands::system::register(&mut registry, started)
        .context("Failed to register system commands")?;
    info!("Registered {} commands", registry.len());

    let bot = Bot::new(&config.telegram.bot_token);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let username = telegram::bot_username(&bot).await?;
    info!("  Bot username: {}", username.as_deref().unwrap_or("N/A"));
    let router = Arc::new(
        CommandRouter::new(Arc::new(registry), config.admin_id.clone(), messenger)
            .with_bot_username(username),
    );

    telegram::publish_commands(&bot, router.registry()).await;
    router.notify_startup().await;

    info!("Bot is starting...");
    telegram::run(bot, router).await?;

    Ok(())
}
