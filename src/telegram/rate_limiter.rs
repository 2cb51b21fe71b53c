//! Pacing for Bot API polling.
//!
//! Enforces a minimum interval between `getUpdates` calls and honours
//! the `retry_after` Telegram sends with flood-limit errors.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Rate limiter that enforces minimum intervals between operations.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum duration between allowed operations.
    min_interval: Duration,

    /// Earliest time the next operation may run.
    next_allowed: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_allowed: Mutex::new(None),
        }
    }

    /// Waits until an operation is allowed, then marks the operation as performed.
    ///
    /// Returns the duration waited (0 if no wait was needed).
    pub async fn wait_and_acquire(&self) -> Duration {
        let mut next = self.next_allowed.lock().await;

        let wait_duration = next
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or_default();

        if !wait_duration.is_zero() {
            debug!("Rate limiter: waiting {:?} before next poll", wait_duration);
            tokio::time::sleep(wait_duration).await;
        }

        *next = Some(Instant::now() + self.min_interval);
        wait_duration
    }

    /// Returns the time remaining until the next operation is allowed.
    pub async fn time_until_allowed(&self) -> Duration {
        let next = self.next_allowed.lock().await;
        next.map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }

    /// Pushes the next allowed operation back by a Telegram flood wait.
    pub async fn handle_flood_wait(&self, wait_seconds: u32) {
        warn!(
            "Received flood wait from Telegram: {} seconds",
            wait_seconds
        );

        let until = Instant::now() + Duration::from_secs(u64::from(wait_seconds));
        let mut next = self.next_allowed.lock().await;
        if next.is_none_or(|at| at < until) {
            *next = Some(until);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_first_operation() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        assert_eq!(limiter.time_until_allowed().await, Duration::ZERO);

        let waited = limiter.wait_and_acquire().await;
        assert_eq!(waited, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limiter_subsequent_operation() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        limiter.wait_and_acquire().await;

        let remaining = limiter.time_until_allowed().await;
        assert!(remaining > Duration::ZERO);

        let waited = limiter.wait_and_acquire().await;
        assert!(waited > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_interval_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        assert_eq!(limiter.wait_and_acquire().await, Duration::ZERO);
        assert_eq!(limiter.wait_and_acquire().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_flood_wait_extends_deadline() {
        let limiter = RateLimiter::new(Duration::from_millis(10));
        limiter.wait_and_acquire().await;

        limiter.handle_flood_wait(30).await;
        let remaining = limiter.time_until_allowed().await;
        assert!(remaining > Duration::from_secs(25));
    }
}
