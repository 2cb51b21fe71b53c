//! Gold Rate Bot Library
//!
//! A Telegram bot that answers with today's Kolkata 22k gold rate,
//! scraped from the Anandabazar business pages.
//!
//! This crate provides the core functionality for:
//! - Loading bot configuration from the environment
//! - Fetching the rate page and extracting the price from its rate table
//! - Routing chat commands and free text to replies
//! - Long-polling the Telegram Bot API and answering messages in order

pub mod commands;
pub mod config;
pub mod poller;
pub mod rate;
pub mod telegram;
