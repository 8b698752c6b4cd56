//! Error types for the dynamic DNS updater
//!
//! [`ReconcileError`] is the flat taxonomy of everything that can go wrong in a
//! single reconciliation cycle, one variant per failure point. [`Error`] wraps it
//! together with the errors of the surrounding glue (configuration, IP discovery,
//! transport setup).

use crate::model::ApiMessage;
use crate::traits::TransportError;
use std::fmt;
use thiserror::Error;

/// Result type alias for dyndns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Provider call a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /zones?name=...`
    ZoneLookup,
    /// `GET /zones/:zone_id/dns_records?name=...`
    RecordLookup,
    /// `POST /zones/:zone_id/dns_records`
    RecordCreate,
    /// `PUT /zones/:zone_id/dns_records/:record_id`
    RecordUpdate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ZoneLookup => "zone lookup",
            Operation::RecordLookup => "record lookup",
            Operation::RecordCreate => "record create",
            Operation::RecordUpdate => "record update",
        };
        f.write_str(name)
    }
}

/// Failure of a reconciliation cycle
///
/// Every variant aborts the cycle. Nothing is retried at this layer; the
/// scheduler logs the error and tries again on its next tick.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The zone list request could not be sent or its body not read
    #[error("failed to list zones: {0}")]
    ZoneLookupFailed(TransportError),

    /// The zone list body was not a valid provider envelope
    #[error("failed to decode zones list: {0}")]
    ZoneDecodeFailed(serde_json::Error),

    /// No zone named exactly like the configured domain
    #[error("no matching zone found for {domain}")]
    NoMatchingZone { domain: String },

    /// The record list request could not be sent or its body not read
    #[error("failed to get records: {0}")]
    RecordLookupFailed(TransportError),

    /// The record list body was not a valid provider envelope
    #[error("failed to decode records: {0}")]
    RecordDecodeFailed(serde_json::Error),

    /// More than one record matches the hostname
    #[error("too many records found for {name}: {count}")]
    AmbiguousRecordSet { name: String, count: usize },

    /// The create request could not be sent or its body not read
    #[error("failed to create record: {0}")]
    RecordCreateFailed(TransportError),

    /// The create response was not a valid provider envelope
    #[error("failed to decode record creation: {0}")]
    RecordCreateDecodeFailed(serde_json::Error),

    /// The update request could not be sent or its body not read
    #[error("failed to update record: {0}")]
    RecordUpdateFailed(TransportError),

    /// The update response was not a valid provider envelope
    #[error("failed to decode record update: {0}")]
    RecordUpdateDecodeFailed(serde_json::Error),

    /// Non-success HTTP status, or `success: false` in the envelope
    #[error(
        "{operation} rejected by provider (HTTP {status}{}){}",
        status_hint(.status),
        format_messages(.errors)
    )]
    ProviderRejected {
        operation: Operation,
        status: u16,
        errors: Vec<ApiMessage>,
    },

    /// The provider reported success but returned no record
    #[error("no record returned by {operation}")]
    EmptyResult { operation: Operation },

    /// The request could not be constructed
    #[error("failed to build {operation} request: {reason}")]
    RequestBuildFailed { operation: Operation, reason: String },
}

fn status_hint(status: &u16) -> &'static str {
    match *status {
        401 | 403 => ", invalid API token or insufficient permissions",
        404 => ", not found",
        429 => ", rate limit exceeded",
        500..=599 => ", provider server error",
        _ => "",
    }
}

fn format_messages(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect();
    format!(": {}", joined.join(", "))
}

/// Core error type for the dynamic DNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// A reconciliation cycle failed
    #[error("Reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Public IP discovery failed
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport could not be set up
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl Error {
    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
