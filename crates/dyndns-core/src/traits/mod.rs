//! Core traits for the dynamic DNS updater
//!
//! This module defines the abstract interfaces the engine is assembled from.
//!
//! - [`HttpTransport`]: Send HTTP requests (injected, never global)
//! - [`IpSource`]: Discover the current public IPv4 address
//! - [`Reconciler`]: Bring the provider's record in line with the desired state

pub mod http_transport;
pub mod ip_source;
pub mod reconciler;

pub use http_transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
pub use ip_source::IpSource;
pub use reconciler::Reconciler;
