// # HTTP Transport Trait
//
// The single seam between the updater and the network. The reconciler and the
// IP source receive an `Arc<dyn HttpTransport>` instead of building clients of
// their own, so tests can substitute a scripted transport.
//
// Implementations own timeouts, TLS and connection reuse. They do not retry and
// do not interpret status codes: any response that arrives is returned as-is.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// HTTP methods used against the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        })
    }
}

/// A fully described outgoing request
///
/// Query pairs are kept unencoded; the transport encodes them.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a request without query, headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// First header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// Authorization carries the API token and must never reach the logs.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "<REDACTED>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();

        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query)
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// A received response: status code and raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Exactly 200; the provider answers every call with 200 when it succeeds
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Transport-level failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be constructed (bad URL, bad header value)
    #[error("failed to build request: {0}")]
    Build(String),

    /// The request was not answered (connection, TLS, timeout, body read)
    #[error("request failed: {0}")]
    Send(String),
}

/// Trait for HTTP transport implementations
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return whatever response arrives
    ///
    /// # Returns
    ///
    /// - `Ok(HttpResponse)`: Any status, including 4xx/5xx
    /// - `Err(TransportError)`: The request was not built or not answered
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
