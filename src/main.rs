//! Gold Rate Bot - Main Entry Point
//!
//! A Telegram bot that replies with today's Kolkata 22k gold rate
//! on `/todays_gold_rate` or when a message mentions "gold rate".

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gold_rate_bot::commands::{CommandHandler, Router};
use gold_rate_bot::config::BotConfig;
use gold_rate_bot::poller::{PollerMessage, UpdatePoller};
use gold_rate_bot::rate::GoldRateSource;
use gold_rate_bot::telegram::TelegramBot;

/// Telegram bot that answers with today's gold rate.
#[derive(Parser, Debug)]
#[command(name = "gold_rate_bot")]
#[command(about = "Reply to Telegram chats with today's Kolkata 22k gold rate")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let config = BotConfig::from_env().context("Failed to load bot configuration")?;
    info!(
        "Gold rate source: {} (container: {})",
        config.source.url, config.source.container_class
    );

    info!("Starting bot...");
    let bot = TelegramBot::new(config.telegram.clone()).context("Failed to create Telegram client")?;
    let me = bot.get_me().await.context("Failed to authorize with bot token")?;

    let username = config.telegram.resolve_username(me.username.as_deref());
    info!("Answering group messages that mention {}", username);

    let source = GoldRateSource::new(config.source.clone())
        .context("Failed to create rate page client")?;
    let handler = CommandHandler::new(Router::gold_rate(username), source);

    if let Err(e) = bot.set_my_commands(&handler.router().command_menu()).await {
        warn!("Failed to publish command menu: {}", e);
    }

    let mut poller = UpdatePoller::new(
        bot,
        handler,
        Duration::from_secs(config.settings.poll_interval_secs),
    );

    let (poller_tx, poller_rx) = mpsc::channel::<PollerMessage>(1);
    let poller_handle = tokio::spawn(async move {
        poller.run(poller_rx).await;
    });

    info!("Bot is running. Use Ctrl+C to stop.");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    let _ = poller_tx.send(PollerMessage::Shutdown).await;
    let _ = poller_handle.await;

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
