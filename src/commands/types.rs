//! Command parsing and reply types.

use std::fmt;

/// A `/command` found at the start of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInvocation<'a> {
    /// Command name without the leading slash, e.g. `todays_gold_rate`.
    pub name: &'a str,

    /// Bot the command was addressed to (`/start@some_bot`), if any.
    pub mention: Option<&'a str>,
}

impl<'a> CommandInvocation<'a> {
    /// Parses a command from a message text.
    ///
    /// The name is the run of ASCII letters, digits and underscores after
    /// the slash, optionally followed by `@botname`. Anything after that is
    /// ignored, so `/start, please` is still `/start`.
    ///
    /// Returns `None` if the message does not start with a command.
    #[must_use]
    pub fn parse(text: &'a str) -> Option<Self> {
        let rest = text.strip_prefix('/')?;

        let (name, rest) = split_word(rest);
        if name.is_empty() {
            return None;
        }

        let mention = rest
            .strip_prefix('@')
            .map(|rest| split_word(rest).0)
            .filter(|bot| !bot.is_empty());

        Some(Self { name, mention })
    }

    /// Checks whether the command is meant for the bot with `username`.
    ///
    /// Commands without a mention are meant for every bot in the chat.
    #[must_use]
    pub fn is_addressed_to(&self, username: &str) -> bool {
        self.mention
            .is_none_or(|bot| bot.eq_ignore_ascii_case(username))
    }

    /// Checks whether this is the command registered as `name`, ignoring case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

fn split_word(text: &str) -> (&str, &str) {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    text.split_at(end)
}

impl fmt::Display for CommandInvocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name)?;
        if let Some(bot) = self.mention {
            write!(f, "@{bot}")?;
        }
        Ok(())
    }
}

/// What a route decided to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Send this fixed text.
    Text(&'static str),

    /// Look up today's rate and send the rate sentence.
    GoldRate,

    /// Stay silent.
    Ignore,
}
