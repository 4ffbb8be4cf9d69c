//! Retrieval of the raw stats payload
//!
//! The poll loop only depends on [`StatsSource`]: either a payload comes back
//! or the fetch failed. Every failure kind is treated the same way upstream.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{instrument, trace};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(StatusCode),

    #[error("empty response")]
    EmptyBody,

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch one raw record.
    async fn fetch(&self) -> Result<String, FetchError>;

    /// Human readable name of the source, used in logs and alert metadata.
    fn describe(&self) -> String;
}

/// Fetches the stats record with a plain `GET` request.
#[derive(Debug, Clone)]
pub struct HttpStatsSource {
    client: Client,
    url: String,
}

impl HttpStatsSource {
    /// The client is built once and reused; `timeout` bounds every request.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StatsSource for HttpStatsSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<String, FetchError> {
        trace!("requesting stats");

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        trace!("received {} bytes", body.len());
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
