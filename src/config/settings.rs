//! Application settings, Telegram credentials and rate source configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    DEFAULT_API_BASE_URL, DEFAULT_BOT_USERNAME, DEFAULT_CONTAINER_CLASS, DEFAULT_SOURCE_URL,
};

/// Telegram Bot API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub bot_token: String,

    /// Username the bot answers to in group chats (without the `@`).
    /// When unset, the username reported by `getMe` is used.
    #[serde(default)]
    pub bot_username: Option<String>,

    /// Base URL of the Bot API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Long-poll timeout passed to `getUpdates`, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

const fn default_poll_timeout() -> u64 {
    10
}

impl TelegramConfig {
    /// Creates a new Telegram configuration with default endpoint and username.
    #[must_use]
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            bot_username: None,
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }

    /// Resolves the username to match in group chats, preferring the
    /// configured one over the one reported by Telegram.
    #[must_use]
    pub fn resolve_username(&self, reported: Option<&str>) -> String {
        self.bot_username
            .as_deref()
            .or(reported)
            .unwrap_or(DEFAULT_BOT_USERNAME)
            .to_owned()
    }

    /// Builds the full URL of a Bot API method.
    #[must_use]
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("bot_username", &self.bot_username)
            .field("api_base_url", &self.api_base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

/// Where the gold rate is scraped from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// Page holding the rate table.
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Class of the element wrapping the rate table.
    #[serde(default = "default_container_class")]
    pub container_class: String,
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_owned()
}

fn default_container_class() -> String {
    DEFAULT_CONTAINER_CLASS.to_owned()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            container_class: default_container_class(),
        }
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotSettings {
    /// Minimum interval between two `getUpdates` calls, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

const fn default_poll_interval() -> u64 {
    3
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// Everything the bot needs at startup, passed explicitly into the poller.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub source: SourceConfig,
    pub settings: BotSettings,
}

impl BotConfig {
    /// Creates configuration from environment variables.
    ///
    /// `TG_BOT_TOKEN` is required. Optional: `TG_BOT_USERNAME`,
    /// `TG_API_BASE_URL`, `POLL_TIMEOUT_SECS`, `GOLD_RATE_URL`,
    /// `GOLD_RATE_CONTAINER_CLASS`, `POLL_INTERVAL_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or a numeric value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or a numeric value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("TG_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar("TG_BOT_TOKEN"))?;

        let telegram = TelegramConfig {
            bot_token,
            bot_username: lookup("TG_BOT_USERNAME")
                .map(|name| name.trim_start_matches('@').to_owned())
                .filter(|name| !name.is_empty()),
            api_base_url: lookup("TG_API_BASE_URL").unwrap_or_else(default_api_base_url),
            poll_timeout_secs: parse_or(&lookup, "POLL_TIMEOUT_SECS", default_poll_timeout())?,
        };

        let source = SourceConfig {
            url: lookup("GOLD_RATE_URL").unwrap_or_else(default_source_url),
            container_class: lookup("GOLD_RATE_CONTAINER_CLASS")
                .unwrap_or_else(default_container_class),
        };

        let settings = BotSettings {
            poll_interval_secs: parse_or(&lookup, "POLL_INTERVAL_SECS", default_poll_interval())?,
        };

        Ok(Self {
            telegram,
            source,
            settings,
        })
    }
}

fn parse_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value for {key}: '{value}' (must be a non-negative integer)")]
    InvalidValue { key: &'static str, value: String },
}
