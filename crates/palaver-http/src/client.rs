//! HTTP client with connection pooling and cancellation-aware requests

use crate::config::HttpClientConfig;
use crate::error::{HttpError, HttpResult};
use crate::response::{from_reqwest, HttpResponse};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Connection-pooled async HTTP client
///
/// Cheap to clone; all clones share the same connection pool. Intended
/// to be constructed once per adapter and reused across calls.
///
/// # Example
///
/// ```ignore
/// use palaver_http::{HttpClient, HttpClientConfig};
/// use tokio_util::sync::CancellationToken;
///
/// let config = HttpClientConfig::new()
///     .base_url("https://api.example.com")
///     .timeout_secs(30.0);
/// let client = HttpClient::new(config)?;
///
/// let response = client
///     .post_json("/v1/echo", &[], &serde_json::json!({"ping": true}), &CancellationToken::new())
///     .await?;
/// println!("Status: {}, Latency: {}ms", response.status_code, response.latency_ms);
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .brotli(config.brotli)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpClientInner { client, config }),
        })
    }

    /// Create a client with default configuration
    pub fn default_client() -> HttpResult<Self> {
        Self::new(HttpClientConfig::default())
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> Option<&str> {
        self.inner.config.base_url.as_deref()
    }

    /// Send a POST request with a JSON body and extra headers.
    ///
    /// `url` may be absolute or relative to the configured base URL.
    /// The token races the in-flight send and body retrieval: if it is
    /// cancelled before the full response has been read, the call fails
    /// with [`HttpError::Cancelled`] and the connection is dropped.
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> HttpResult<HttpResponse> {
        let url = self.absolute_url(url)?;
        debug!(target: "palaver_http", %url, "POST");

        let mut request = self.inner.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let start = Instant::now();
        let fetch = async {
            let response = request.send().await?;
            let latency_ms = start.elapsed().as_millis() as u64;
            from_reqwest(response, latency_ms).await
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(HttpError::Cancelled),
            result = fetch => result,
        }
    }

    fn absolute_url(&self, url: &str) -> HttpResult<url::Url> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url::Url::parse(url)?);
        }

        let base = self.base_url().ok_or_else(|| {
            HttpError::InvalidRequest(format!(
                "Relative URL '{}' requires a configured base URL",
                url
            ))
        })?;

        let joined = format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'));
        Ok(url::Url::parse(&joined)?)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.config.base_url)
            .field("timeout", &self.inner.config.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = HttpClientConfig::new()
            .base_url("https://api.example.com")
            .timeout_secs(30.0);

        let client = HttpClient::new(config).unwrap();
        assert_eq!(client.base_url(), Some("https://api.example.com"));
    }

    #[test]
    fn test_default_client() {
        let client = HttpClient::default_client().unwrap();
        assert!(client.base_url().is_none());
    }

    #[test]
    fn test_absolute_url_resolution() {
        let client = HttpClient::new(
            HttpClientConfig::new().base_url("https://api.example.com/v1/"),
        )
        .unwrap();

        let absolute = client.absolute_url("https://other.example.com/x").unwrap();
        assert_eq!(absolute.as_str(), "https://other.example.com/x");

        let relative = client.absolute_url("/models/foo:generateText").unwrap();
        assert_eq!(
            relative.as_str(),
            "https://api.example.com/v1/models/foo:generateText"
        );
    }

    #[test]
    fn test_relative_url_without_base_fails() {
        let client = HttpClient::default_client().unwrap();
        assert!(matches!(
            client.absolute_url("/models"),
            Err(HttpError::InvalidRequest(_))
        ));
    }
}
