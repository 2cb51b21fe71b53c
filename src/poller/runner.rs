//! Update polling loop.
//!
//! Each pass:
//! 1. Wait for the pacer (minimum interval between polls, flood waits)
//! 2. Fetch pending updates after the last seen `update_id`
//! 3. Handle each message to completion and send its reply, in order
//!
//! Failures are logged and the loop keeps polling.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::commands::CommandHandler;
use crate::rate::RateProvider;
use crate::telegram::{ChatKind, Message, RateLimiter, TelegramBot, TelegramError, Update};

/// Messages that can be sent to the poller.
#[derive(Debug, Clone)]
pub enum PollerMessage {
    /// Stop polling.
    Shutdown,
}

/// Long-polls Telegram and answers messages one at a time.
pub struct UpdatePoller<P> {
    /// Bot API client.
    bot: TelegramBot,

    /// Message handler.
    handler: CommandHandler<P>,

    /// Paces `getUpdates` calls.
    pacer: RateLimiter,

    /// Next update id to request.
    offset: Option<i64>,
}

impl<P: RateProvider> UpdatePoller<P> {
    /// Creates a new poller.
    #[must_use]
    pub fn new(bot: TelegramBot, handler: CommandHandler<P>, poll_interval: Duration) -> Self {
        Self {
            bot,
            handler,
            pacer: RateLimiter::new(poll_interval),
            offset: None,
        }
    }

    /// Returns the offset the next poll will use.
    #[must_use]
    pub const fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Runs the polling loop until shutdown.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<PollerMessage>) {
        info!("Polling...");

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(PollerMessage::Shutdown) | None => {
                            info!("Poller shutting down");
                            break;
                        }
                    }
                }
                handled = self.poll_once() => {
                    if handled > 0 {
                        debug!("Handled {} updates", handled);
                    }
                }
            }
        }
    }

    /// Polls once and handles every update received.
    ///
    /// Returns the number of updates consumed.
    pub async fn poll_once(&mut self) -> usize {
        self.pacer.wait_and_acquire().await;

        let updates = match self.bot.get_updates(self.offset).await {
            Ok(updates) => updates,
            Err(TelegramError::FloodWait(seconds)) => {
                self.pacer.handle_flood_wait(seconds).await;
                info!(
                    "Polling paused for {:?}",
                    self.pacer.time_until_allowed().await
                );
                return 0;
            }
            Err(e) => {
                error!("Failed to poll updates: {}", e);
                return 0;
            }
        };

        let count = updates.len();
        for update in updates {
            self.offset = Some(update.update_id + 1);
            self.process(update).await;
        }

        count
    }

    async fn process(&self, update: Update) {
        let Some(message) = update.message else {
            debug!("Skipping update {} without a message", update.update_id);
            return;
        };

        let Some(reply) = self.handler.handle(&message).await else {
            return;
        };

        let reply_to = quote_target(&message);
        match self.bot.send_message(message.chat.id, &reply, reply_to).await {
            Ok(_) => {}
            Err(TelegramError::FloodWait(seconds)) => {
                warn!("Reply to chat {} dropped by flood limit", message.chat.id);
                self.pacer.handle_flood_wait(seconds).await;
            }
            Err(e) => error!(
                "Update {} caused error {}",
                update.update_id, e
            ),
        }

        if let Some(sent_at) = message.sent_at() {
            debug!("Answered message sent at {}", sent_at.to_rfc3339());
        }
    }
}

impl<P> std::fmt::Debug for UpdatePoller<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdatePoller")
            .field("bot", &self.bot)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Group replies quote the message they answer; private replies do not.
fn quote_target(message: &Message) -> Option<i64> {
    matches!(message.chat.kind, ChatKind::Group | ChatKind::Supergroup)
        .then_some(message.message_id)
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::commands::Router;
    use crate::config::TelegramConfig;
    use crate::rate::RateLookup;

    struct FixedRate;

    impl RateProvider for FixedRate {
        fn current_rate(&self) -> impl Future<Output = RateLookup> + Send {
            std::future::ready(RateLookup::Found("6,650".to_owned()))
        }
    }

    fn poller_for(server: &MockServer) -> UpdatePoller<FixedRate> {
        let mut config = TelegramConfig::new("1:t".to_owned());
        config.api_base_url = server.uri();
        config.poll_timeout_secs = 0;
        let bot = TelegramBot::new(config).unwrap();
        let handler = CommandHandler::new(Router::gold_rate("paper_gold_rate_bot"), FixedRate);
        UpdatePoller::new(bot, handler, Duration::ZERO)
    }

    fn update(id: i64, kind: &str, text: &str) -> serde_json::Value {
        json!({
            "update_id": id,
            "message": {
                "message_id": id * 10,
                "date": 1700000000,
                "chat": {"id": 500, "type": kind},
                "text": text
            }
        })
    }

    #[tokio::test]
    async fn test_poll_once_answers_and_advances_offset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [
                    update(7, "private", "/todays_gold_rate"),
                    update(8, "private", "/start")
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": 500,
                "text": "Todays Anadabazar Kolkata 22k Gold Rate is 6,650 inr."
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 1, "date": 1700000001, "chat": {"id": 500, "type": "private"}}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": 500,
                "text": "Hello, Welcome to Gold Paper rate tracking bot"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 2, "date": 1700000001, "chat": {"id": 500, "type": "private"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut poller = poller_for(&server);
        assert_eq!(poller.poll_once().await, 2);
        assert_eq!(poller.offset(), Some(9));
    }

    #[tokio::test]
    async fn test_ignored_group_message_still_advances_offset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [update(3, "group", "gold rate")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/sendMessage"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let mut poller = poller_for(&server);
        assert_eq!(poller.poll_once().await, 1);
        assert_eq!(poller.offset(), Some(4));
    }

    #[tokio::test]
    async fn test_send_failure_does_not_stop_polling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [update(1, "private", "hi"), update(2, "private", "gold rate")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/sendMessage"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false, "error_code": 400, "description": "Bad Request: chat not found"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let mut poller = poller_for(&server);
        assert_eq!(poller.poll_once().await, 2);
        assert_eq!(poller.offset(), Some(3));
    }

    #[tokio::test]
    async fn test_poll_error_keeps_offset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "ok": false, "error_code": 409, "description": "Conflict: terminated by other getUpdates request"
            })))
            .mount(&server)
            .await;

        let mut poller = poller_for(&server);
        assert_eq!(poller.poll_once().await, 0);
        assert_eq!(poller.offset(), None);
    }

    #[tokio::test]
    async fn test_flood_wait_pauses_polling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot1:t/getUpdates"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "ok": false,
                "error_code": 429,
                "description": "Too Many Requests: retry after 30",
                "parameters": {"retry_after": 30}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut poller = poller_for(&server);
        assert_eq!(poller.poll_once().await, 0);
        assert_eq!(poller.offset(), None);
        assert!(poller.pacer.time_until_allowed().await > Duration::from_secs(25));
    }

    #[tokio::test]
    async fn test_shutdown_stops_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "result": []}))
                    .set_delay(Duration::from_millis(50)),
            )
            .mount(&server)
            .await;

        let mut poller = poller_for(&server);
        let (tx, rx) = mpsc::channel(1);
        tx.send(PollerMessage::Shutdown).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), poller.run(rx))
            .await
            .unwrap();
    }

    #[test]
    fn test_quote_target() {
        let message_in = |kind: &str| {
            serde_json::from_value::<Message>(json!({
                "message_id": 5, "date": 0, "chat": {"id": 1, "type": kind}
            }))
            .unwrap()
        };
        assert_eq!(quote_target(&message_in("group")), Some(5));
        assert_eq!(quote_target(&message_in("supergroup")), Some(5));
        assert_eq!(quote_target(&message_in("private")), None);
    }
}
