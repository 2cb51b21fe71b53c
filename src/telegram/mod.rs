//! Telegram client module.
//!
//! Provides a small Bot API client (token authentication, long polling,
//! replies) and pacing for the polling loop.

mod client;
mod rate_limiter;
mod types;

pub use client::{TelegramBot, TelegramError};
pub use rate_limiter::RateLimiter;
pub use types::{BotCommandInfo, Chat, ChatKind, Message, Update, User};
