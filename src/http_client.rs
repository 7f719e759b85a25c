//! HTTP client shared by the metadata client and provider fetches.
//!
//! Features:
//! - One pooled `reqwest` client per process (HTTP/2, rustls, brotli/gzip)
//! - Fixed `User-Agent` and `Referer` on every request
//! - Per-request timeouts so no fetch can hang a resolve call

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::ResolverConfig;
use crate::error::{FetchError, ResolveError};

/// Fetches a provider URL as text.
///
/// The resolver depends on this trait rather than on `reqwest` directly so
/// the fan-out logic can be driven by in-process fakes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// `reqwest`-backed client carrying the fixed request headers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build a client from the resolver configuration.
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(REFERER, header_value(&config.referer)?);

        let client = Client::builder()
            .default_headers(headers)
            // Keep connections alive for reuse across providers
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ResolveError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ResolveError> {
    HeaderValue::from_str(value)
        .map_err(|_| ResolveError::Config(format!("invalid header value: {value:?}")))
}

#[async_trait]
impl Fetcher for HttpClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let start = Instant::now();
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::from(e)
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify)?;
        debug!(
            status = %status,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "provider response received"
        );
        Ok(body)
    }
}
