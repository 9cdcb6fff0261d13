//! Remote holiday feed access.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::Error;

/// Published CSV of Japanese national holiday dates and names.
pub const FEED_URL: &str = "https://holidays-jp.github.io/api/v1/date.csv";

const USER_AGENT: &str = concat!("syukujitsu/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw holiday feed bytes.
///
/// The cache manager treats this as an opaque I/O boundary: retries and
/// transport details belong to the implementation, failures are propagated
/// to the query that triggered the fetch.
#[async_trait]
pub trait HolidayFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>, Error>;
}

/// HTTP feed client with connection pooling and a request timeout.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpFeed {
    /// Client against the published feed.
    pub fn new() -> Self {
        Self::with_url(FEED_URL)
    }

    /// Client against an alternate host serving the same CSV shape.
    pub fn with_url(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build holiday feed HTTP client");

        HttpFeed {
            client,
            url: url.into(),
        }
    }
}

impl Default for HttpFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HolidayFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<u8>, Error> {
        debug!("fetching holiday feed: {}", self.url);

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("feed returned HTTP {status}")));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        debug!("holiday feed responded with {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
