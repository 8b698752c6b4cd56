//! Test doubles and fixtures for reconciliation contract tests
//!
//! [`ScriptedTransport`] answers requests from a queue of canned responses and
//! records every request it sees, so tests can assert both the outcome and the
//! exact wire traffic that produced it.

#![allow(dead_code)]

use dyndns_core::DesiredState;
use dyndns_core::traits::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use dyndns_provider_cloudflare::CloudflareReconciler;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

pub const BASE: &str = "https://api.cloudflare.test/client/v4";
pub const TOKEN: &str = "test-token-0123456789";

/// A transport that replays scripted responses in order
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response
    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(HttpResponse::new(status, body.to_string())))
    }

    /// Queue a raw (possibly malformed) response
    pub fn push_raw(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(HttpResponse::new(status, body)))
    }

    /// Queue a transport failure
    pub fn push_error(&self, err: TransportError) -> &Self {
        self.push(Err(err))
    }

    fn push(&self, response: Result<HttpResponse, TransportError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of POST and PUT requests sent so far
    pub fn write_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r.method, Method::Post | Method::Put))
            .count()
    }

    /// Scripted responses that were never consumed
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Send("no scripted response left".to_string())))
    }
}

/// A reconciler wired to `transport`
pub fn reconciler(transport: &Arc<ScriptedTransport>) -> CloudflareReconciler {
    CloudflareReconciler::new(transport.clone()).with_base_url(BASE)
}

/// `home.example.com` → `ip`, proxied
pub fn desired(ip: Ipv4Addr) -> DesiredState {
    DesiredState {
        domain: "example.com".to_string(),
        subdomain: "home".to_string(),
        target_ip: ip,
        proxied: true,
        auth_token: TOKEN.to_string(),
    }
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

/// Success envelope around `result`
pub fn envelope(result: Value) -> Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
    })
}

/// Failure envelope with one provider error
pub fn failure(code: i64, message: &str) -> Value {
    json!({
        "success": false,
        "errors": [{"code": code, "message": message}],
        "messages": [],
        "result": null,
    })
}

pub fn zone(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name, "status": "active"})
}

pub fn record(id: &str, name: &str, content: &str, ttl: u32) -> Value {
    json!({
        "id": id,
        "zone_id": "zone-1",
        "zone_name": "example.com",
        "name": name,
        "type": "A",
        "content": content,
        "proxiable": true,
        "proxied": true,
        "locked": false,
        "ttl": ttl,
    })
}

/// Queue the standard zone lookup answer for example.com
pub fn script_zone(transport: &ScriptedTransport) {
    transport.push_json(200, envelope(json!([zone("zone-1", "example.com")])));
}

/// Decode a request body as JSON
pub fn body_json(request: &HttpRequest) -> Value {
    let body = request.body.as_ref().expect("request has a body");
    serde_json::from_slice(body).expect("body is JSON")
}
