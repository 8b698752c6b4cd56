//! Test doubles and common utilities for engine contract tests
//!
//! Both doubles are cheap handles over shared state: the test keeps one clone
//! to script answers and inspect calls, the engine owns the other.

#![allow(dead_code)]

use dyndns_core::traits::{IpSource, Reconciler};
use dyndns_core::{DesiredState, DnsRecord, DyndnsConfig, EngineEvent, Error, Outcome, ReconcileError};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub const TOKEN: &str = "test-token-0123456789";

/// An IpSource answering from a script, then repeating a fixed address
#[derive(Clone)]
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<Result<Ipv4Addr, Error>>>>,
    fallback: Ipv4Addr,
    calls: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    /// Always answer `ip`
    pub fn fixed(ip: Ipv4Addr) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: ip,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a failure for the next call
    pub fn fail_next(&self, msg: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(Error::ip_source(msg)));
        self
    }

    /// Queue an address for the next call
    pub fn answer_next(&self, ip: Ipv4Addr) -> &Self {
        self.script.lock().unwrap().push_back(Ok(ip));
        self
    }

    /// Number of times current() was called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<Ipv4Addr, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.fallback))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A Reconciler that records every desired state it is handed
///
/// Unscripted calls answer `NoChange` with a record already holding the
/// target address.
#[derive(Clone, Default)]
pub struct MockReconciler {
    script: Arc<Mutex<VecDeque<Result<Outcome, ReconcileError>>>>,
    seen: Arc<Mutex<Vec<DesiredState>>>,
}

impl MockReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next call
    pub fn push(&self, result: Result<Outcome, ReconcileError>) -> &Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    /// Desired states received so far
    pub fn seen(&self) -> Vec<DesiredState> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Reconciler for MockReconciler {
    async fn reconcile(&self, desired: &DesiredState) -> Result<Outcome, ReconcileError> {
        self.seen.lock().unwrap().push(desired.clone());
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(Outcome::NoChange(record(
                &desired.full_hostname(),
                &desired.target_content(),
            )))
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Configuration for `home.example.com` with a one minute interval
pub fn minimal_config() -> DyndnsConfig {
    DyndnsConfig::new(TOKEN, "example.com", "home").with_interval(Duration::from_secs(60))
}

pub fn record(name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: "rec-1".to_string(),
        zone_id: "zone-1".to_string(),
        name: name.to_string(),
        record_type: "A".to_string(),
        content: content.to_string(),
        ttl: 1,
        proxied: true,
        proxiable: true,
        locked: false,
    }
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

/// Receive events until one matches `pred`, failing after `limit` events
pub async fn wait_for<F>(rx: &mut mpsc::Receiver<EngineEvent>, limit: usize, pred: F) -> EngineEvent
where
    F: Fn(&EngineEvent) -> bool,
{
    for _ in 0..limit {
        let event = rx.recv().await.expect("engine event channel open");
        if pred(&event) {
            return event;
        }
    }
    panic!("no matching event within {limit} events");
}
