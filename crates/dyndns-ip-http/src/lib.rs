// # HTTP IP Source
//
// This crate discovers the public IPv4 address by asking an HTTP service that
// answers with a JSON object of the form `{"ip": "203.0.113.5"}`
// (ipify and compatible services).
//
// ## Behavior
//
// - One GET per call, no caching: every cycle sees the live address
// - Only HTTP 200 is accepted
// - The `ip` field must parse as an IPv4 address (IPv6 is not published)
//
// ## Architecture
//
// The request goes through the injected `HttpTransport`, the same one the
// reconciler uses, so timeouts and the user agent are configured once.

use async_trait::async_trait;
use dyndns_core::config::DEFAULT_IP_URL;
use dyndns_core::traits::{HttpRequest, HttpTransport, IpSource, Method};
use dyndns_core::{Error, Result};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Body returned by the IP service
#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// HTTP-based public address source
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// Shared HTTP transport
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for HttpIpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIpSource")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpIpSource {
    /// Create a source querying the default service
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_url(transport, DEFAULT_IP_URL)
    }

    /// Create a source querying `url`
    ///
    /// # Parameters
    ///
    /// - `transport`: HTTP transport used for the request
    /// - `url`: Endpoint answering `{"ip": "..."}` (e.g., "https://api.ipify.org?format=json")
    pub fn with_url(transport: Arc<dyn HttpTransport>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transport,
        }
    }

    /// The URL queried on every call
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Decode and validate the service's answer
fn parse_body(body: &[u8]) -> Result<Ipv4Addr> {
    let decoded: IpResponse = serde_json::from_slice(body)
        .map_err(|e| Error::ip_source(format!("Failed to decode response: {}", e)))?;

    let text = decoded.ip.trim();
    text.parse::<Ipv4Addr>()
        .map_err(|_| Error::ip_source(format!("Not an IPv4 address: {}", text)))
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Fetching public address from {}", self.url);

        let response = self
            .transport
            .send(HttpRequest::new(Method::Get, self.url.as_str()))
            .await
            .map_err(|e| Error::ip_source(format!("Request failed: {}", e)))?;

        if !response.is_ok() {
            return Err(Error::ip_source(format!(
                "HTTP error: {} from {}",
                response.status, self.url
            )));
        }

        let ip = parse_body(&response.body)?;
        tracing::debug!("Public address is {}", ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
