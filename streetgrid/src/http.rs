//! HTTP client abstraction for testability
//!
//! Every external collaborator (metadata API, place resolution, image
//! download) talks HTTP through [`AsyncHttpClient`], so tests can substitute
//! a mock client and production code uses [`AsyncReqwestClient`].

use reqwest::Url;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent string for HTTP requests.
///
/// The place-resolution service rejects anonymous clients, so every request
/// identifies itself.
pub const DEFAULT_USER_AGENT: &str = concat!("streetgrid/", env!("CARGO_PKG_VERSION"));

/// Transport-level HTTP errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The request could not be sent or the body could not be read
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request URL could not be built
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// A received HTTP response.
///
/// Non-2xx responses are returned as values rather than errors: APIs put
/// their error payloads in those bodies and callers decide how to report
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response from a status code and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for asynchronous HTTP client operations.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request, query string included
    ///
    /// # Returns
    ///
    /// The response status and body, or a transport error.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;

    /// Performs an async HTTP GET request with custom headers.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `headers` - Slice of (header_name, header_value) tuples
    fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

/// Builds a URL with URL-encoded query parameters.
pub fn build_url(base: &str, params: &[(&str, String)]) -> Result<String, HttpError> {
    Url::parse_with_params(base, params.iter().map(|(k, v)| (*k, v.as_str())))
        .map(|url| url.to_string())
        .map_err(|e| HttpError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| HttpError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<HttpResponse, HttpError> {
        let response = match request.send().await {
            Ok(resp) => {
                debug!(
                    url = redact(url),
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = redact(url),
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(HttpError::Transport(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = redact(url), bytes = bytes.len(), "HTTP response body read");
                Ok(HttpResponse::new(status, bytes.to_vec()))
            }
            Err(e) => {
                warn!(url = redact(url), error = %e, "Failed to read response body");
                Err(HttpError::Transport(format!("Failed to read response: {}", e)))
            }
        }
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        trace!(url = redact(url), "HTTP GET request starting");
        self.send(self.client.get(url), url).await
    }

    async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.send(request, url).await
    }
}

/// Strips the query string so access tokens never reach the logs.
fn redact(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Responder = dyn Fn(&str) -> Result<HttpResponse, HttpError> + Send + Sync;

    /// Mock async HTTP client for testing.
    ///
    /// Answers every request through a responder closure and records the
    /// requested URLs.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        responder: Arc<Responder>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockAsyncHttpClient {
        pub fn with_responder<F>(responder: F) -> Self
        where
            F: Fn(&str) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
        {
            Self {
                responder: Arc::new(responder),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Always answers with the same status and body.
        pub fn with_body(status: u16, body: &str) -> Self {
            let body = body.to_string();
            Self::with_responder(move |_| Ok(HttpResponse::new(status, body.clone())))
        }

        /// Always fails with a transport error.
        pub fn failing(message: &str) -> Self {
            let message = message.to_string();
            Self::with_responder(move |_| Err(HttpError::Transport(message.clone())))
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn respond(&self, url: &str) -> Result<HttpResponse, HttpError> {
            self.requests.lock().unwrap().push(url.to_string());
            (self.responder)(url)
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
            self.respond(url)
        }

        async fn get_with_headers(
            &self,
            url: &str,
            _headers: &[(&str, &str)],
        ) -> Result<HttpResponse, HttpError> {
            self.respond(url)
        }
    }

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url(
            "https://example.com/images",
            &[
                ("bbox", "1,2,3,4".to_string()),
                ("q", "São Paulo".to_string()),
            ],
        )
        .unwrap();

        assert!(url.starts_with("https://example.com/images?"));
        assert!(url.contains("bbox=1%2C2%2C3%2C4"));
        assert!(url.contains("q=S%C3%A3o+Paulo"));
    }

    #[test]
    fn test_build_url_rejects_relative_base() {
        let result = build_url("not a url", &[]);
        assert!(matches!(result, Err(HttpError::InvalidUrl { .. })));
    }

    #[test]
    fn test_redact_strips_query() {
        assert_eq!(
            redact("https://example.com/images?access_token=secret"),
            "https://example.com/images"
        );
        assert_eq!(redact("https://example.com/a"), "https://example.com/a");
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(400, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[tokio::test]
    async fn test_mock_async_client_records_requests() {
        let mock = MockAsyncHttpClient::with_body(200, "ok");

        let response = mock.get("http://example.com/a").await.unwrap();
        assert_eq!(response.body, b"ok");
        mock.get_with_headers("http://example.com/b", &[("User-Agent", "test")])
            .await
            .unwrap();

        assert_eq!(
            mock.requests(),
            vec!["http://example.com/a", "http://example.com/b"]
        );
    }

    #[tokio::test]
    async fn test_mock_async_client_error() {
        let mock = MockAsyncHttpClient::failing("Connection refused");
        let result = mock.get("http://example.com").await;
        assert_eq!(
            result,
            Err(HttpError::Transport("Connection refused".to_string()))
        );
    }
}
