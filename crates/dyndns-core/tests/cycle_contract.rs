//! Contract Test: Single Update Cycle
//!
//! This test verifies what one call to `run_cycle` does, without the timer.
//!
//! Constraints verified:
//! - The desired state is built from configuration plus the discovered address
//! - IP discovery failure ends the cycle before any provider call
//! - Reconciliation errors are returned, not swallowed
//! - Each outcome is reported as its own event
//!
//! If this test fails, the engine is reshaping or hiding cycle results.

mod common;

use common::*;
use dyndns_core::{DyndnsEngine, EngineEvent, Error, Outcome, ReconcileError};

#[tokio::test]
async fn desired_state_comes_from_config_and_discovered_ip() {
    let ip_source = ScriptedIpSource::fixed(ip("203.0.113.5"));
    let reconciler = MockReconciler::new();

    let mut config = minimal_config();
    config.proxied = false;

    let (engine, _events) = DyndnsEngine::new(
        Box::new(ip_source.clone()),
        Box::new(reconciler.clone()),
        config,
    )
    .expect("engine construction succeeds");

    engine.run_cycle().await.expect("cycle succeeds");

    let seen = reconciler.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].domain, "example.com");
    assert_eq!(seen[0].subdomain, "home");
    assert_eq!(seen[0].target_ip, ip("203.0.113.5"));
    assert!(!seen[0].proxied);
    assert_eq!(seen[0].auth_token, TOKEN);
}

#[tokio::test]
async fn ip_discovery_failure_skips_reconcile() {
    let ip_source = ScriptedIpSource::fixed(ip("203.0.113.5"));
    ip_source.fail_next("HTTP error: 503");
    let reconciler = MockReconciler::new();

    let (engine, _events) = DyndnsEngine::new(
        Box::new(ip_source.clone()),
        Box::new(reconciler.clone()),
        minimal_config(),
    )
    .unwrap();

    let err = engine.run_cycle().await.unwrap_err();
    assert!(matches!(err, Error::IpSource(_)));
    assert_eq!(ip_source.calls(), 1);
    assert_eq!(reconciler.calls(), 0, "no provider call without an address");
}

#[tokio::test]
async fn reconcile_error_is_returned() {
    let reconciler = MockReconciler::new();
    reconciler.push(Err(ReconcileError::NoMatchingZone {
        domain: "example.com".to_string(),
    }));

    let (engine, _events) = DyndnsEngine::new(
        Box::new(ScriptedIpSource::fixed(ip("203.0.113.5"))),
        Box::new(reconciler),
        minimal_config(),
    )
    .unwrap();

    let err = engine.run_cycle().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Reconcile(ReconcileError::NoMatchingZone { .. })
    ));
    assert!(err.to_string().contains("no matching zone found for example.com"));
}

#[tokio::test]
async fn outcomes_are_reported_as_events() {
    let reconciler = MockReconciler::new();
    reconciler
        .push(Ok(Outcome::Created(record("home.example.com", "203.0.113.5"))))
        .push(Ok(Outcome::Updated(record("home.example.com", "203.0.113.6"))));

    let ip_source = ScriptedIpSource::fixed(ip("203.0.113.6"));
    ip_source.answer_next(ip("203.0.113.5"));

    let (engine, mut events) =
        DyndnsEngine::new(Box::new(ip_source), Box::new(reconciler), minimal_config()).unwrap();

    assert!(matches!(engine.run_cycle().await, Ok(Outcome::Created(_))));
    assert!(matches!(engine.run_cycle().await, Ok(Outcome::Updated(_))));
    assert!(matches!(engine.run_cycle().await, Ok(Outcome::NoChange(_))));
    drop(engine);

    let mut received = Vec::new();
    while let Some(event) = events.recv().await {
        received.push(event);
    }

    let outcomes: Vec<_> = received
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                EngineEvent::IpDiscovered { .. }
                    | EngineEvent::RecordCreated { .. }
                    | EngineEvent::RecordUpdated { .. }
                    | EngineEvent::RecordUnchanged { .. }
            )
        })
        .collect();

    assert_eq!(
        outcomes,
        vec![
            EngineEvent::IpDiscovered { ip: ip("203.0.113.5") },
            EngineEvent::RecordCreated {
                name: "home.example.com".to_string(),
                content: "203.0.113.5".to_string(),
            },
            EngineEvent::IpDiscovered { ip: ip("203.0.113.6") },
            EngineEvent::RecordUpdated {
                name: "home.example.com".to_string(),
                content: "203.0.113.6".to_string(),
            },
            EngineEvent::IpDiscovered { ip: ip("203.0.113.6") },
            EngineEvent::RecordUnchanged {
                name: "home.example.com".to_string(),
                content: "203.0.113.6".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let mut config = minimal_config();
    config.interval_secs = 0;

    let result = DyndnsEngine::new(
        Box::new(ScriptedIpSource::fixed(ip("203.0.113.5"))),
        Box::new(MockReconciler::new()),
        config,
    );

    assert!(matches!(result, Err(Error::Config(_))));
}
