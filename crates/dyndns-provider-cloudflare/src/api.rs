//! Cloudflare API v4 response envelope
//!
//! Every endpoint answers with the same envelope; only the shape of `result`
//! differs (a list for the lookups, a single record for create and update).
//! The caller picks the shape through the type parameter, so each endpoint is
//! decoded exactly as what it returns.

use dyndns_core::traits::{HttpResponse, TransportError};
use dyndns_core::{ApiMessage, Operation, ReconcileError};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// `{success, errors, messages, result}`
#[derive(Debug, Deserialize)]
pub struct ProviderResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub messages: Vec<ResponseMessage>,
    pub result: Option<T>,
}

/// Informational entry of `messages`
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
}

// Rejections often come with an envelope that is otherwise incomplete, or with
// no JSON at all; only the error list is worth salvaging.
#[derive(Deserialize)]
struct RejectionBody {
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

/// Map a transport failure to the error kind of the step it happened in
pub fn transport_failed(operation: Operation, err: TransportError) -> ReconcileError {
    match err {
        TransportError::Build(reason) => ReconcileError::RequestBuildFailed { operation, reason },
        send @ TransportError::Send(_) => match operation {
            Operation::ZoneLookup => ReconcileError::ZoneLookupFailed(send),
            Operation::RecordLookup => ReconcileError::RecordLookupFailed(send),
            Operation::RecordCreate => ReconcileError::RecordCreateFailed(send),
            Operation::RecordUpdate => ReconcileError::RecordUpdateFailed(send),
        },
    }
}

/// Map a body decoding failure to the error kind of the step it happened in
pub fn decode_failed(operation: Operation, err: serde_json::Error) -> ReconcileError {
    match operation {
        Operation::ZoneLookup => ReconcileError::ZoneDecodeFailed(err),
        Operation::RecordLookup => ReconcileError::RecordDecodeFailed(err),
        Operation::RecordCreate => ReconcileError::RecordCreateDecodeFailed(err),
        Operation::RecordUpdate => ReconcileError::RecordUpdateDecodeFailed(err),
    }
}

/// Turn a raw response into the endpoint's `result`
///
/// Anything but HTTP 200 is a rejection whatever the body says, and so is
/// `success: false`. The envelope is read with `result` left raw, so a
/// rejection keeps its error list even when `result` has an unexpected shape.
pub fn interpret<T: DeserializeOwned>(
    operation: Operation,
    response: &HttpResponse,
) -> Result<Option<T>, ReconcileError> {
    if !response.is_ok() {
        let errors = serde_json::from_slice::<RejectionBody>(&response.body)
            .map(|body| body.errors)
            .unwrap_or_default();
        tracing::warn!("{} returned HTTP {}: {:?}", operation, response.status, errors);
        return Err(ReconcileError::ProviderRejected {
            operation,
            status: response.status,
            errors,
        });
    }

    let envelope: ProviderResponse<serde_json::Value> =
        serde_json::from_slice(&response.body).map_err(|e| decode_failed(operation, e))?;

    if !envelope.success {
        tracing::warn!("{} reported failure: {:?}", operation, envelope.errors);
        return Err(ReconcileError::ProviderRejected {
            operation,
            status: response.status,
            errors: envelope.errors,
        });
    }

    for message in &envelope.messages {
        tracing::debug!("{} message [{}]: {}", operation, message.code, message.message);
    }

    envelope
        .result
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| decode_failed(operation, e))
}
