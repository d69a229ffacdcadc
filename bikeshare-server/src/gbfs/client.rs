//! GBFS HTTP client.
//!
//! Both feeds are requested concurrently and joined under a single deadline:
//! either both arrive in time and parse, or the whole fetch fails.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::{FeedKind, FetchError};
use super::types::{Feed, InfoPayload, StatusPayload};

/// Default feed base URL (BIXI Montréal, GBFS 2.2, English).
pub const DEFAULT_BASE_URL: &str = "https://gbfs.velobixi.com/gbfs/2-2/en";

/// Default deadline for fetching both feeds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the GBFS client.
#[derive(Debug, Clone)]
pub struct GbfsConfig {
    /// Base URL the feed file names are appended to
    pub base_url: String,
    /// Shared deadline for both feed requests
    pub timeout: Duration,
}

impl GbfsConfig {
    /// Create a new config for the given base URL with the default deadline.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the shared fetch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn info_url(&self) -> String {
        format!(
            "{}/station_information.json",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn status_url(&self) -> String {
        format!(
            "{}/station_status.json",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl Default for GbfsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Something that can produce a matching pair of station feeds.
///
/// Implemented by [`GbfsClient`]; the refresh cycle is generic over it so it
/// can be driven by scripted sources in tests.
pub trait FeedSource: Send + Sync {
    fn fetch(
        &self,
    ) -> impl Future<Output = Result<(InfoPayload, StatusPayload), FetchError>> + Send;
}

impl<T: FeedSource> FeedSource for Arc<T> {
    fn fetch(
        &self,
    ) -> impl Future<Output = Result<(InfoPayload, StatusPayload), FetchError>> + Send {
        T::fetch(self)
    }
}

/// Client for a GBFS system's station feeds.
#[derive(Debug, Clone)]
pub struct GbfsClient {
    http: reqwest::Client,
    info_url: String,
    status_url: String,
    timeout: Duration,
}

impl GbfsClient {
    /// Create a new GBFS client with the given configuration.
    pub fn new(config: GbfsConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bikeshare-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            info_url: config.info_url(),
            status_url: config.status_url(),
            timeout: config.timeout,
        })
    }

    /// Fetch both feeds.
    ///
    /// The two requests are in flight at the same time. If either fails, the
    /// other is dropped and the first failure is returned; if the deadline
    /// elapses first, both are dropped and `FetchError::Timeout` is returned.
    pub async fn fetch(&self) -> Result<(InfoPayload, StatusPayload), FetchError> {
        let both = async {
            tokio::try_join!(
                self.get_feed(FeedKind::Info, &self.info_url),
                self.get_feed(FeedKind::Status, &self.status_url),
            )
        };

        tokio::time::timeout(self.timeout, both)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }

    async fn get_feed<T: DeserializeOwned>(
        &self,
        feed: FeedKind,
        url: &str,
    ) -> Result<Feed<T>, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(feed, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                feed,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(feed, e))?;

        serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
            feed,
            message: e.to_string(),
        })
    }

    fn transport_error(&self, feed: FeedKind, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport { feed, source }
        }
    }
}

impl FeedSource for GbfsClient {
    fn fetch(
        &self,
    ) -> impl Future<Output = Result<(InfoPayload, StatusPayload), FetchError>> + Send {
        GbfsClient::fetch(self)
    }
}
