//! Command handling module.
//!
//! Routes chat messages (`/start`, `/help`, `/todays_gold_rate` and
//! free text mentioning "gold rate") to their replies.

mod handler;
mod router;
mod types;

pub use handler::{CommandHandler, format_rate_reply};
pub use router::{
    GOLD_RATE_PHRASE, HELP_MESSAGE, Handler, Router, START_MESSAGE, TextPredicate,
    UNKNOWN_MESSAGE, mentions_gold_rate,
};
pub use types::{CommandInvocation, Reply};
