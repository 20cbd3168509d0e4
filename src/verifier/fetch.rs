//! Fetching source pages.
//!
//! [`SourceFetcher`] is the seam between the verifier and the network. The
//! production implementation, [`HttpFetcher`], wraps a `reqwest` client with
//! a whole-request timeout and a cap on the body size, so a slow or huge
//! source costs a bounded amount of time and memory and then counts as a
//! failed verification.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// User agent sent with every source fetch.
const USER_AGENT: &str = concat!("webmention-receiver/", env!("CARGO_PKG_VERSION"));

/// A fetched source page.
///
/// `body` is only read for 2xx responses; it is empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    pub status: u16,
    pub body: String,
}

impl SourcePage {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        SourcePage {
            status,
            body: body.into(),
        }
    }
}

/// Errors that prevent a source page from being fetched at all.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, redirect or protocol failure.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The body exceeded the configured size cap.
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl FetchError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(error)
        }
    }
}

/// Fetches the page a mention claims as its source.
pub trait SourceFetcher {
    /// GETs `url`, following redirects.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<SourcePage, FetchError>> + Send;
}

/// [`SourceFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Builds a fetcher whose requests are abandoned after `timeout` and whose
    /// bodies are limited to `max_body_bytes`.
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Request)?;

        Ok(HttpFetcher {
            client,
            max_body_bytes,
        })
    }
}

impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<SourcePage, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Ok(SourcePage::new(status.as_u16(), String::new()));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(FetchError::from_reqwest)? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::BodyTooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(SourcePage::new(
            status.as_u16(),
            String::from_utf8_lossy(&body).into_owned(),
        ))
    }
}
