//! Core dyndns engine
//!
//! The DyndnsEngine is responsible for:
//! - Running one reconciliation cycle per timer tick
//! - Discovering the public IP via IpSource
//! - Handing the desired state to the Reconciler
//! - Logging and reporting the outcome without ever stopping on a failed cycle
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     tick      ┌──────────────┐
//! │  Interval   │──────────────▶│ DyndnsEngine │
//! └─────────────┘               └──────────────┘
//!                                      │
//!         ┌────────────────────────────┼───────────────────────────┐
//!         │                            │                           │
//!         ▼                            ▼                           ▼
//! ┌─────────────┐             ┌──────────────┐            ┌─────────────┐
//! │  IpSource   │             │  Reconciler  │            │   Events    │
//! │ (discover)  │             │ (reconcile)  │            │  (notify)   │
//! └─────────────┘             └──────────────┘            └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Fetch the current public IPv4 address
//! 2. Build the DesiredState from configuration and that address
//! 3. Reconcile (zone lookup → record lookup → create / update / no-op)
//! 4. Emit an event for monitoring/logging
//!
//! A failure at any step ends the cycle; the next tick starts a fresh one.

use crate::config::DyndnsConfig;
use crate::error::Result;
use crate::model::{DesiredState, Outcome};
use crate::traits::{IpSource, Reconciler};
use chrono::{DateTime, Utc};
use std::net::Ipv4Addr;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

/// Events emitted by the DyndnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started { hostname: String },

    /// A reconciliation cycle began
    CycleStarted { at: DateTime<Utc> },

    /// Public IP discovered for this cycle
    IpDiscovered { ip: Ipv4Addr },

    /// The record did not exist and was created
    RecordCreated { name: String, content: String },

    /// The record was updated to a new address
    RecordUpdated { name: String, content: String },

    /// The record already had the current address
    RecordUnchanged { name: String, content: String },

    /// The cycle failed; the engine keeps running
    CycleFailed { error: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// Core dyndns engine
///
/// ## Lifecycle
///
/// 1. Create with [`DyndnsEngine::new()`]
/// 2. Run with [`DyndnsEngine::run_until_shutdown()`]
/// 3. The first cycle runs immediately, then one per interval
/// 4. Returns when the shutdown receiver fires (or its sender is dropped)
///
/// ## Threading
///
/// Cycles run one after another on a single task; a cycle is never
/// interrupted by shutdown, which is observed between cycles.
pub struct DyndnsEngine {
    /// Public IP discovery
    ip_source: Box<dyn IpSource>,

    /// Provider reconciliation
    reconciler: Box<dyn Reconciler>,

    /// Static part of the desired state
    config: DyndnsConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DyndnsEngine {
    /// Create a new engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_source: Box<dyn IpSource>,
        reconciler: Box<dyn Reconciler>,
        config: DyndnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            ip_source,
            reconciler,
            config,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run cycles on the configured interval until shutdown
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    pub async fn run_until_shutdown(&self, mut shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        let hostname = self.config.full_hostname();
        info!(
            "Managing {} via {} every {:?}",
            hostname,
            self.reconciler.provider_name(),
            self.config.interval()
        );
        self.emit_event(EngineEvent::Started { hostname });

        let mut interval = tokio::time::interval(self.config.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(interval);

        loop {
            tokio::select! {
                // Shutdown wins when both are ready
                biased;

                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }

                Some(_) = ticks.next() => {
                    if let Err(e) = self.run_cycle().await {
                        error!("Update cycle failed: {}", e);
                        self.emit_event(EngineEvent::CycleFailed {
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        info!("Engine stopped");
        Ok(())
    }

    /// Run a single reconciliation cycle
    ///
    /// Public so that one-shot callers can update once without the timer.
    pub async fn run_cycle(&self) -> Result<Outcome> {
        self.emit_event(EngineEvent::CycleStarted { at: Utc::now() });
        info!("Initiating IP update");

        let ip = self.ip_source.current().await?;
        info!("Current public IP ({}): {}", self.ip_source.source_name(), ip);
        self.emit_event(EngineEvent::IpDiscovered { ip });

        let desired = self.desired_state(ip);
        debug!("Reconciling {:?}", desired);

        let outcome = self.reconciler.reconcile(&desired).await?;
        self.report(&outcome);

        Ok(outcome)
    }

    fn desired_state(&self, target_ip: Ipv4Addr) -> DesiredState {
        DesiredState {
            domain: self.config.domain.clone(),
            subdomain: self.config.subdomain.clone(),
            target_ip,
            proxied: self.config.proxied,
            auth_token: self.config.api_token.clone(),
        }
    }

    fn report(&self, outcome: &Outcome) {
        let record = outcome.record();
        let name = record.name.clone();
        let content = record.content.clone();

        match outcome {
            Outcome::NoChange(_) => {
                info!("IP not changed since last update: {} -> {}", name, content);
                self.emit_event(EngineEvent::RecordUnchanged { name, content });
            }
            Outcome::Created(_) => {
                info!("Created record {} -> {}", name, content);
                self.emit_event(EngineEvent::RecordCreated { name, content });
            }
            Outcome::Updated(_) => {
                info!("Updated record {} -> {}", name, content);
                self.emit_event(EngineEvent::RecordUpdated { name, content });
            }
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Dropped rather than awaited so a slow consumer never stalls a cycle
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("No event receiver, dropping event");
            }
        }
    }
}
