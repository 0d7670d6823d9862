//! Page fetcher with structured logging and no retries.
//!
//! - One GET per call, with a request timeout and a connect timeout
//! - Non-2xx statuses are errors; the body is only kept as a short snippet
//! - [`PageSource`] lets the pipeline run against something other than the
//!   network (crawl tests feed it canned pages)
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo() -> Result<(), caf_http::HttpError> {
//! use std::time::Duration;
//!
//! let client = caf_http::HttpClient::new("caf-scrape/0.1", Duration::from_secs(10))?
//!     .with_timeout(Duration::from_secs(30));
//! let url = caf_http::parse_url("https://www.ncsc.gov.uk/collection/cyber-assessment-framework")?;
//! let html = client.get_text(&url).await?;
//! # let _ = html;
//! # Ok(()) }
//! ```
//!
//! Observability: `fetch.start` before the request, `fetch.ok` with byte count,
//! duration and a blake3 checksum of the body, `fetch.error` on failure.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use caf_common::CafError;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

const SNIPPET_MAX: usize = 500;

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("client build failed: {0}")]
    Build(String),
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("{url} returned {status}, body_snippet: {body_snippet}")]
    Status {
        url: String,
        status: StatusCode,
        body_snippet: String,
    },
}

impl From<HttpError> for CafError {
    fn from(err: HttpError) -> Self {
        CafError::Network(err.to_string())
    }
}

pub fn parse_url(raw: &str) -> Result<Url, HttpError> {
    Url::parse(raw).map_err(|e| HttpError::Url(format!("{raw}: {e}")))
}

// ==============================
// Page source
// ==============================

/// Anything that can hand back the HTML of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String, HttpError>;
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Build a client that sends `user_agent` and gives up connecting after
    /// `connect_timeout`.
    ///
    /// ```no_run
    /// use caf_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("caf-scrape/0.1", Duration::from_secs(10))?;
    /// assert_eq!(client.timeout(), Duration::from_secs(30));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(user_agent: &str, connect_timeout: Duration) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            default_timeout: Duration::from_secs(30),
        })
    }

    /// Override the whole-request timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Whole-request timeout applied to every fetch.
    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// GET `url` and return the body as text. A single attempt.
    pub async fn get_text(&self, url: &Url) -> Result<String, HttpError> {
        let timeout = self.default_timeout;
        tracing::info!(
            url = %url,
            timeout_ms = timeout.as_millis() as u64,
            "fetch.start"
        );

        let t0 = Instant::now();
        let network = |err: reqwest::Error| {
            let message = if err.is_timeout() {
                format!("timed out after {}ms", timeout.as_millis())
            } else {
                err.to_string()
            };
            tracing::warn!(url = %url, message = %message, "fetch.error");
            HttpError::Network {
                url: url.to_string(),
                message,
            }
        };

        let resp = self
            .inner
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(network)?;
        let status = resp.status();
        let body = resp.text().await.map_err(network)?;
        let duration_ms = t0.elapsed().as_millis() as u64;

        if !status.is_success() {
            let body_snippet = snip_body(&body);
            tracing::warn!(
                url = %url,
                %status,
                duration_ms,
                body_snippet = %body_snippet,
                "fetch.error"
            );
            return Err(HttpError::Status {
                url: url.to_string(),
                status,
                body_snippet,
            });
        }

        tracing::info!(
            url = %url,
            %status,
            duration_ms,
            bytes = body.len(),
            blake3 = %blake3::hash(body.as_bytes()).to_hex(),
            "fetch.ok"
        );
        Ok(body)
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, url: &Url) -> Result<String, HttpError> {
        self.get_text(url).await
    }
}

// ==============================
// Helpers
// ==============================

fn snip_body(body: &str) -> String {
    let mut snip = body.trim().to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}
