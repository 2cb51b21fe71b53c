//! Telegram Bot API client.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use super::types::{
    ApiResponse, BotCommandInfo, Empty, GetUpdatesRequest, Message, SendMessageRequest,
    SetMyCommandsRequest, Update, User,
};
use crate::config::TelegramConfig;

/// Slack on top of the long-poll timeout before a request is abandoned.
const REQUEST_GRACE: Duration = Duration::from_secs(10);

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i32, description: String },

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Telegram API returned no result for {0}")]
    MissingResult(&'static str),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs embed the bot token.
        Self::Http(err.without_url())
    }
}

/// Thin client over the Bot API methods the bot uses.
#[derive(Clone)]
pub struct TelegramBot {
    client: Client,
    config: TelegramConfig,
}

impl TelegramBot {
    /// Creates a client for the given bot.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    /// Fetches the bot's own account, confirming the token is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        info!("Checking bot token...");
        let me: User = self.call("getMe", &Empty {}, REQUEST_GRACE).await?;
        info!(
            "Authorized as @{}",
            me.username.as_deref().unwrap_or(&me.first_name)
        );
        Ok(me)
    }

    /// Long-polls for new messages starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Telegram rejects it.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.config.poll_timeout_secs,
            allowed_updates: &["message"],
        };
        let timeout = Duration::from_secs(self.config.poll_timeout_secs) + REQUEST_GRACE;

        let updates: Vec<Update> = self.call("getUpdates", &request, timeout).await?;
        if !updates.is_empty() {
            debug!("Received {} updates (offset {:?})", updates.len(), offset);
        }
        Ok(updates)
    }

    /// Sends a text message, optionally as a reply to another message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Telegram rejects it.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<Message, TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_to_message_id,
        };
        self.call("sendMessage", &request, REQUEST_GRACE).await
    }

    /// Publishes the command menu shown by Telegram clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Telegram rejects it.
    pub async fn set_my_commands(&self, commands: &[BotCommandInfo]) -> Result<(), TelegramError> {
        let accepted: bool = self
            .call("setMyCommands", &SetMyCommandsRequest { commands }, REQUEST_GRACE)
            .await?;
        debug!("setMyCommands accepted: {}", accepted);
        Ok(())
    }

    async fn call<REQ, RES>(
        &self,
        method: &'static str,
        request: &REQ,
        timeout: Duration,
    ) -> Result<RES, TelegramError>
    where
        REQ: Serialize,
        RES: DeserializeOwned,
    {
        let response: ApiResponse<RES> = self
            .client
            .post(self.config.method_url(method))
            .timeout(timeout)
            .json(request)
            .send()
            .await?
            .json()
            .await?;

        into_result(method, response)
    }
}

fn into_result<T>(method: &'static str, response: ApiResponse<T>) -> Result<T, TelegramError> {
    if response.ok {
        return response.result.ok_or(TelegramError::MissingResult(method));
    }

    if let Some(seconds) = response.parameters.and_then(|p| p.retry_after) {
        return Err(TelegramError::FloodWait(seconds));
    }

    Err(TelegramError::Api {
        code: response.error_code.unwrap_or_default(),
        description: response
            .description
            .unwrap_or_else(|| "no description".to_owned()),
    })
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
