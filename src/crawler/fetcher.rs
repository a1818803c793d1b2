//! HTTP fetcher with rate limiting and legacy charset support
//!
//! This module provides the HTTP side of the pipeline:
//! - User-Agent rotation (or a fixed agent from configuration)
//! - Rate limiting with governor
//! - Automatic retry with exponential backoff
//! - Charset detection for the index page (header, meta tag, UTF-8, Windows-1252)
//! - Raw byte retrieval for documents

use async_trait::async_trait;
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client, Response,
};
use std::num::NonZeroU32;
use std::time::Duration;

use super::{BinaryRetriever, PageFetcher};
use crate::config::HttpConfig;
use crate::utils::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// How much of a page is scanned for a `<meta charset>` declaration
const META_SNIFF_LEN: usize = 2048;

/// HTTP fetcher shared by the index fetch and all document downloads
pub struct DocumentFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Maximum number of retry attempts for failed requests
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,

    /// Fixed user agent; rotated from the pool when `None`
    user_agent: Option<String>,
}

impl DocumentFetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_config(
            config.requests_per_second,
            config.max_retries,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        fetcher.base_delay_ms = config.retry_base_delay_ms;
        fetcher.user_agent = config.user_agent.clone();
        Ok(fetcher)
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    /// * `max_retries` - Maximum number of retry attempts
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            max_retries,
            base_delay_ms: 500,
            user_agent: None,
        })
    }

    /// Override the backoff base delay
    #[must_use]
    pub fn with_retry_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay_ms = base_delay.as_millis() as u64;
        self
    }

    /// Fetch the index page and decode it to text
    ///
    /// # Errors
    ///
    /// Returns various `FetchError` variants depending on the failure mode
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.fetch_with_retry(url).await?;
        decode_response(response).await
    }

    /// Fetch a document as raw bytes
    ///
    /// # Errors
    ///
    /// Returns various `FetchError` variants depending on the failure mode
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.fetch_with_retry(url).await?;
        Ok(response.bytes().await?)
    }

    /// Send a GET with rate limiting and exponential backoff
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Status` for non-retryable statuses and
    /// `FetchError::MaxRetriesExceeded` once all retries fail
    async fn fetch_with_retry(&self, url: &str) -> Result<Response, FetchError> {
        reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt);
                tracing::debug!(url = %url, attempt, delay_ms = delay.as_millis() as u64, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            self.rate_limiter.until_ready().await;

            match self
                .client
                .get(url)
                .headers(self.build_headers())
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    } else if Self::should_retry(status.as_u16()) {
                        last_error = Some(FetchError::Status(status.as_u16()));
                    } else {
                        return Err(FetchError::Status(status.as_u16()));
                    }
                }
                Err(e) if e.is_timeout() => last_error = Some(FetchError::Timeout),
                Err(e) => last_error = Some(FetchError::Http(e)),
            }
        }

        Err(FetchError::MaxRetriesExceeded {
            last: last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string()),
        })
    }

    /// Delay before retry number `attempt` (1-based), doubling each time
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Determine if a status code should trigger a retry
    ///
    /// Retry on 429 and 500/502/503/504. Other 4xx are final.
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    /// Build HTTP headers for a request
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let agent = match &self.user_agent {
            Some(agent) => HeaderValue::from_str(agent).ok(),
            None => Some(HeaderValue::from_static(random_user_agent())),
        };
        if let Some(agent) = agent {
            headers.insert(USER_AGENT, agent);
        }

        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("es-PE,es;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        headers
    }
}

#[async_trait]
impl PageFetcher for DocumentFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_text(url).await
    }
}

#[async_trait]
impl BinaryRetriever for DocumentFetcher {
    async fn retrieve(&self, url: &str) -> Result<Bytes, FetchError> {
        self.fetch_bytes(url).await
    }
}

/// Decode a response body using its declared or sniffed charset
async fn decode_response(response: Response) -> Result<String, FetchError> {
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_default();

    let bytes = response.bytes().await?;

    decode_bytes(&bytes, &content_type)
}

/// Decode bytes to a UTF-8 string with charset detection
///
/// Strategies, in order:
/// 1. `charset=` in the Content-Type header
/// 2. `charset=` in a meta tag near the top of the page
/// 3. UTF-8
/// 4. Windows-1252, which also covers ISO-8859-1 pages
///
/// # Errors
///
/// Returns `FetchError::Decode` if a declared charset is unknown or the bytes
/// are invalid for it
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    if let Some(label) = charset_label(content_type) {
        return decode_with(label, bytes);
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(META_SNIFF_LEN)]);
    if let Some(label) = charset_label(&head) {
        if let Ok(text) = decode_with(label, bytes) {
            return Ok(text);
        }
    }

    let (cow, had_errors) = UTF_8.decode_without_bom_handling(bytes);
    if !had_errors {
        return Ok(cow.into_owned());
    }

    let (cow, _, _) = WINDOWS_1252.decode(bytes);
    Ok(cow.into_owned())
}

fn decode_with(label: &str, bytes: &[u8]) -> Result<String, FetchError> {
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| FetchError::Decode(format!("unknown charset {label:?}")))?;

    let (cow, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(FetchError::Decode(format!(
            "invalid {} content",
            encoding.name()
        )));
    }

    Ok(cow.into_owned())
}

/// Find the value of the first `charset=` in `text`
fn charset_label(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let rest = text[start..].trim_start_matches(['"', '\'']);
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let label = &rest[..end];
    (!label.is_empty()).then_some(label)
}

/// Get a random user agent from the pool
fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
}
