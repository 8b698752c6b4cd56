//! reqwest-backed [`HttpTransport`]
//!
//! The production transport. One instance is built at startup and shared by
//! the reconciler and the IP source.

use crate::error::{Error, Result};
use crate::traits::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use async_trait::async_trait;
use std::time::Duration;

/// Default HTTP timeout for every request (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("dyndns/", env!("CARGO_PKG_VERSION"));

/// HTTP transport over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Transport(TransportError::Build(e.to_string())))?;

        Ok(Self { client })
    }

    /// Build a transport with [`DEFAULT_HTTP_TIMEOUT`]
    pub fn with_default_timeout() -> Result<Self> {
        Self::new(DEFAULT_HTTP_TIMEOUT)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };

        let mut builder = self.client.request(method, request.url.as_str());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        // Invalid URLs and header values surface here, before anything is sent
        let built = builder
            .build()
            .map_err(|e| TransportError::Build(e.without_url().to_string()))?;

        let response = self
            .client
            .execute(built)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Send(format!("failed to read response body: {}", e)))?;

        tracing::trace!("{} {} -> {}", request.method, request.url, status);

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
