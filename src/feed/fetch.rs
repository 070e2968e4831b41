// src/feed/fetch.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::FetchError;

/// Upper bound for a single feed request, connect through last body byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Retrieves the raw body of a feed. Implemented over HTTP in production and
/// by in-memory fakes in tests.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Clone)]
pub struct HttpFeedFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFeedFetcher {
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("feed-mixer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            timeout: FETCH_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        // The status code is not checked: a non-2xx body still goes to the decoder.
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify(url, e, false))?;

        // `bytes()` consumes the response, so the connection is released on both paths.
        let body = resp.bytes().await.map_err(|e| classify(url, e, true))?;
        Ok(body.to_vec())
    }
}

fn classify(url: &str, err: reqwest::Error, reading_body: bool) -> FetchError {
    let url = url.to_string();
    if err.is_timeout() {
        FetchError::Timeout { url }
    } else if reading_body {
        FetchError::Body {
            url,
            reason: err.to_string(),
        }
    } else {
        FetchError::Transport {
            url,
            reason: err.to_string(),
        }
    }
}
