//! Bot API payloads.
//!
//! Only the fields the bot reads are modelled; serde ignores the rest.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope every Bot API method replies with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
    pub parameters: Option<ResponseParameters>,
}

/// Extra information attached to failed requests.
#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before repeating a flood-limited request.
    pub retry_after: Option<u32>,
}

/// An incoming update. Only new messages are requested.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// A chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,

    /// Unix time the message was sent.
    pub date: i64,

    pub chat: Chat,

    pub from: Option<User>,

    pub text: Option<String>,
}

impl Message {
    /// Returns the send time, if the timestamp is representable.
    #[must_use]
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }
}

/// A chat a message was sent in.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,

    #[serde(rename = "type")]
    pub kind: ChatKind,
}

/// Type of chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Supergroup => "supergroup",
            Self::Channel => "channel",
        };
        f.write_str(name)
    }
}

/// A Telegram user or bot.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

/// A command shown in the client's command menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotCommandInfo {
    pub command: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub(super) struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub(super) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SetMyCommandsRequest<'a> {
    pub commands: &'a [BotCommandInfo],
}

#[derive(Debug, Serialize)]
pub(super) struct Empty {}
