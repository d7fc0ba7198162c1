//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made while crawling:
//! - Building the HTTP client with the configured user agent and timeouts
//! - HEAD probes to learn `Content-Type` / `Content-Length` without downloading
//! - GET requests for pages that turned out to be HTML
//! - Optional bounded retries for transient failures
//!
//! Redirects are followed by the client; callers get the final URL back.

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// A failed request; never fatal to a crawl
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// Whether another attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
        }
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = error.status() {
            Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Outcome of a HEAD request
#[derive(Debug, Clone)]
pub struct Probe {
    /// URL after following redirects
    pub final_url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
}

impl Probe {
    /// The `Content-Type` header value, if present and readable
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    /// Whether the resource is an HTML page (`Content-Type: text/html...`)
    pub fn is_html(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
    }
}

/// Body of a GET request
#[derive(Debug, Clone)]
pub struct Page {
    /// URL after following redirects
    pub final_url: String,
    /// Decoded response text
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Identification sent with every request
/// * `crawler` - Timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues probes and page fetches with an optional retry budget
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher
    ///
    /// With `max_retries == 0` every request is attempted exactly once.
    pub fn new(client: Client, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_retries,
            retry_delay,
        }
    }

    /// Builds the client and fetcher from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler)?;
        Ok(Self::new(
            client,
            crawler.max_retries,
            Duration::from_millis(crawler.retry_delay_ms),
        ))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends a HEAD request
    ///
    /// A non-success status is reported as [`FetchError::Status`].
    pub async fn probe(&self, url: &str) -> Result<Probe, FetchError> {
        let client = &self.client;
        self.with_retries(url, move || async move {
            let response = client
                .head(url)
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            Ok(Probe {
                final_url: response.url().to_string(),
                status: status.as_u16(),
                headers: response.headers().clone(),
            })
        })
        .await
    }

    /// Sends a GET request and reads the body as text
    pub async fn fetch_body(&self, url: &str) -> Result<Page, FetchError> {
        let client = &self.client;
        self.with_retries(url, move || async move {
            let response = client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| FetchError::from_reqwest(url, e))?;

            let final_url = response.url().to_string();
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::from_reqwest(url, e))?;

            Ok(Page { final_url, body })
        })
        .await
    }

    async fn with_retries<T, F, Fut>(&self, url: &str, mut attempt: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, FetchError>>,
    {
        let mut tries = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && tries < self.max_retries => {
                    tries += 1;
                    tracing::debug!(
                        "Transient failure for {} ({}), retry {}/{}",
                        url,
                        e,
                        tries,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
