//! Explicit message router.
//!
//! Routing order for a text message:
//! 1. A leading `/command` addressed to this bot with a registered handler
//! 2. In `group` chats, plain text must mention the bot username, else ignore
//! 3. The first text route whose predicate matches
//! 4. The fallback handler

use tracing::debug;

use super::types::{CommandInvocation, Reply};
use crate::telegram::{BotCommandInfo, ChatKind};

/// Handler invoked with the full message text.
pub type Handler = fn(&str) -> Reply;

/// Predicate deciding whether a text route applies.
pub type TextPredicate = fn(&str) -> bool;

/// Greeting sent for `/start`.
pub const START_MESSAGE: &str = "Hello, Welcome to Gold Paper rate tracking bot";

/// Text sent for `/help`.
pub const HELP_MESSAGE: &str = "Simple to use price checking bot";

/// Reply to text that matches no route.
pub const UNKNOWN_MESSAGE: &str = "I do not understand what you saying...";

/// Phrase that asks for the rate in free text.
pub const GOLD_RATE_PHRASE: &str = "gold rate";

struct CommandRoute {
    name: &'static str,
    description: &'static str,
    handler: Handler,
}

struct TextRoute {
    predicate: TextPredicate,
    handler: Handler,
}

/// Maps command names and text predicates to handler functions.
pub struct Router {
    bot_username: String,
    commands: Vec<CommandRoute>,
    text_routes: Vec<TextRoute>,
    fallback: Handler,
}

impl Router {
    /// Creates an empty router that ignores everything.
    #[must_use]
    pub fn new(bot_username: impl Into<String>) -> Self {
        Self {
            bot_username: bot_username.into(),
            commands: Vec::new(),
            text_routes: Vec::new(),
            fallback: |_| Reply::Ignore,
        }
    }

    /// Creates the gold rate bot's routing table.
    #[must_use]
    pub fn gold_rate(bot_username: impl Into<String>) -> Self {
        Self::new(bot_username)
            .command("start", "Welcome message", |_| Reply::Text(START_MESSAGE))
            .command("help", "How to use the bot", |_| Reply::Text(HELP_MESSAGE))
            .command("todays_gold_rate", "Today's Kolkata 22k gold rate", |_| {
                Reply::GoldRate
            })
            .text(mentions_gold_rate, |_| Reply::GoldRate)
            .fallback(|_| Reply::Text(UNKNOWN_MESSAGE))
    }

    /// Registers a command handler.
    #[must_use]
    pub fn command(
        mut self,
        name: &'static str,
        description: &'static str,
        handler: Handler,
    ) -> Self {
        self.commands.push(CommandRoute {
            name,
            description,
            handler,
        });
        self
    }

    /// Registers a free-text handler.
    #[must_use]
    pub fn text(mut self, predicate: TextPredicate, handler: Handler) -> Self {
        self.text_routes.push(TextRoute { predicate, handler });
        self
    }

    /// Sets the handler for text no other route accepts.
    #[must_use]
    pub fn fallback(mut self, handler: Handler) -> Self {
        self.fallback = handler;
        self
    }

    /// Returns the registered commands for the client's command menu.
    #[must_use]
    pub fn command_menu(&self) -> Vec<BotCommandInfo> {
        self.commands
            .iter()
            .map(|route| BotCommandInfo {
                command: route.name.to_owned(),
                description: route.description.to_owned(),
            })
            .collect()
    }

    /// Picks the reply for a message.
    #[must_use]
    pub fn route(&self, chat: ChatKind, text: &str) -> Reply {
        if let Some(handler) = self.command_handler(text) {
            return handler(text);
        }

        // Raw text: the mention check is case-sensitive, unlike the rate phrase.
        if chat == ChatKind::Group && !text.contains(self.bot_username.as_str()) {
            debug!("Ignoring group message not addressed to @{}", self.bot_username);
            return Reply::Ignore;
        }

        self.text_routes
            .iter()
            .find(|route| (route.predicate)(text))
            .map_or(self.fallback, |route| route.handler)(text)
    }

    fn command_handler(&self, text: &str) -> Option<Handler> {
        let invocation = CommandInvocation::parse(text)?;
        if !invocation.is_addressed_to(&self.bot_username) {
            debug!("Command {} is addressed to another bot", invocation);
            return None;
        }

        self.commands
            .iter()
            .find(|route| invocation.is(route.name))
            .map(|route| route.handler)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("bot_username", &self.bot_username)
            .field(
                "commands",
                &self.commands.iter().map(|c| c.name).collect::<Vec<_>>(),
            )
            .field("text_routes", &self.text_routes.len())
            .finish_non_exhaustive()
    }
}

/// Checks whether free text asks for the gold rate, ignoring case.
#[must_use]
pub fn mentions_gold_rate(text: &str) -> bool {
    text.to_lowercase().contains(GOLD_RATE_PHRASE)
}
