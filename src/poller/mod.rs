//! Message polling module.
//!
//! Pulls updates from Telegram and answers them sequentially.

mod runner;

pub use runner::{PollerMessage, UpdatePoller};
