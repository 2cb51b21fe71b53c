//! Command handler implementation.

use tracing::info;

use super::router::Router;
use super::types::Reply;
use crate::rate::{RateLookup, RateProvider};
use crate::telegram::Message;

/// Turns incoming messages into reply text.
pub struct CommandHandler<P> {
    /// Routing table.
    router: Router,

    /// Where rate replies get their price from.
    provider: P,
}

impl<P: RateProvider> CommandHandler<P> {
    /// Creates a new command handler.
    #[must_use]
    pub const fn new(router: Router, provider: P) -> Self {
        Self { router, provider }
    }

    /// Returns the routing table.
    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Handles a message, looking up the rate if the route asks for it.
    ///
    /// Returns `None` if the message has no text or should be ignored.
    pub async fn handle(&self, message: &Message) -> Option<String> {
        let text = message.text.as_deref()?;

        info!(
            "User ({}) in {} : \"{}\"",
            message.chat.id, message.chat.kind, text
        );

        let response = self.respond(message, text).await?;
        info!("Bot : {}", response);

        Some(response)
    }

    async fn respond(&self, message: &Message, text: &str) -> Option<String> {
        match self.router.route(message.chat.kind, text) {
            Reply::Text(reply) => Some(reply.to_owned()),
            Reply::GoldRate => {
                let rate = self.provider.current_rate().await;
                Some(format_rate_reply(&rate))
            }
            Reply::Ignore => None,
        }
    }
}

impl<P> std::fmt::Debug for CommandHandler<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

/// Formats the sentence relaying today's rate.
#[must_use]
pub fn format_rate_reply(rate: &RateLookup) -> String {
    format!("Todays Anadabazar Kolkata 22k Gold Rate is {rate} inr.")
}
