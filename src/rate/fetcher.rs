//! Rate page fetcher.

use reqwest::Client;
use tracing::debug;

use super::RateError;

/// User agent sent with every page request.
const USER_AGENT: &str = concat!("gold_rate_bot/", env!("CARGO_PKG_VERSION"));

/// Fetches page markup over HTTP.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a fetcher using the client's default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client })
    }

    /// Retrieves the body of `url` as text.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Network`] on connection failure or a non-2xx
    /// status.
    pub async fn fetch(&self, url: &str) -> Result<String, RateError> {
        debug!("Fetching rate page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| network_error(url, e))?;

        let body = response.text().await.map_err(|e| network_error(url, e))?;
        debug!("Fetched {} bytes", body.len());

        Ok(body)
    }
}

fn network_error(url: &str, source: reqwest::Error) -> RateError {
    RateError::Network {
        url: url.to_owned(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fetcher() -> PageFetcher {
        PageFetcher::new().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gold"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&format!("{}/gold", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = format!("{}/gold", server.uri());
        let err = fetcher().fetch(&url).await.unwrap_err();
        match err {
            RateError::Network { url: failed, source } => {
                assert_eq!(failed, url);
                assert_eq!(source.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_failure_is_network_error() {
        let server = MockServer::start().await;
        let url = format!("{}/gold", server.uri());
        drop(server);

        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, RateError::Network { .. }));
    }

    #[tokio::test]
    async fn test_fetch_waits_for_slow_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let body = fetcher().fetch(&server.uri()).await.unwrap();
        assert_eq!(body, "late");
    }
}
