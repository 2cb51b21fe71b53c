//! Fetch-then-extract rate lookup.

use std::future::Future;

use tracing::{info, warn};

use super::{PageFetcher, RateLookup, lookup_from_markup};
use crate::config::SourceConfig;

/// Anything that can produce today's gold rate.
pub trait RateProvider {
    /// Looks up the current rate. Never fails; failures become
    /// [`RateLookup::NotFound`].
    fn current_rate(&self) -> impl Future<Output = RateLookup> + Send;
}

/// Scrapes the rate from the configured page on every call.
#[derive(Debug, Clone)]
pub struct GoldRateSource {
    fetcher: PageFetcher,
    config: SourceConfig,
}

impl GoldRateSource {
    /// Creates a source for the given page.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SourceConfig) -> Result<Self, reqwest::Error> {
        let fetcher = PageFetcher::new()?;
        Ok(Self { fetcher, config })
    }

    /// Fetches the page and extracts the rate.
    pub async fn lookup(&self) -> RateLookup {
        let html = match self.fetcher.fetch(&self.config.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Error fetching HTML content: {}", e);
                return RateLookup::NotFound;
            }
        };

        let lookup = lookup_from_markup(&html, &self.config.container_class);
        if let Some(price) = lookup.price() {
            info!("Today's gold rate: {}", price);
        }
        lookup
    }
}

impl RateProvider for GoldRateSource {
    fn current_rate(&self) -> impl Future<Output = RateLookup> + Send {
        self.lookup()
    }
}
