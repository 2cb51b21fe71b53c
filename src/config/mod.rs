//! Configuration module for the gold rate bot.
//!
//! Handles loading of the bot token, the scraped page location
//! and polling settings from the environment.

mod settings;

pub use settings::{BotConfig, BotSettings, ConfigError, SourceConfig, TelegramConfig};

/// Page listing today's gold prices in Kolkata.
pub const DEFAULT_SOURCE_URL: &str =
    "https://www.anandabazar.com/business/today-gold-price-in-kolkata";

/// Class of the element that wraps the 22k price table.
pub const DEFAULT_CONTAINER_CLASS: &str = "tpricetable01";

/// Username the bot is registered under.
pub const DEFAULT_BOT_USERNAME: &str = "paper_gold_rate_bot";

/// Public Telegram Bot API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
