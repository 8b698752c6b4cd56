// # Reconciler Trait
//
// Drives the provider from "what the record should be" to "what the record is".
//
// ## Implementations
//
// - Cloudflare API v4: `dyndns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::{Outcome, Reconciler};
//
// let outcome = reconciler.reconcile(&desired).await?;
// match outcome {
//     Outcome::NoChange(_) => {}
//     Outcome::Created(record) | Outcome::Updated(record) => {
//         println!("{} -> {}", record.name, record.content);
//     }
// }
// ```

use crate::error::ReconcileError;
use crate::model::{DesiredState, Outcome};
use async_trait::async_trait;

/// Trait for record reconciliation against a DNS provider
///
/// # Idempotency
///
/// Reconciling the same desired state twice in a row must not write anything
/// the second time: when the existing record already publishes the target IP
/// the result is [`Outcome::NoChange`] and no write request is issued.
///
/// # Statelessness
///
/// Implementations hold no mutable state between calls. Zones and records are
/// fetched fresh on every invocation, so the result is a function of the
/// desired state and the provider's current state only.
///
/// ## Forbidden Capabilities
/// - ❌ Retry logic or backoff (owned by `DyndnsEngine`)
/// - ❌ Caching zones or records across calls
/// - ❌ Spawning tasks (every call is a strict sequence of requests)
/// - ❌ Silently resolving ambiguous record sets
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Run one reconciliation cycle
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: `NoChange`, `Created` or `Updated`
    /// - `Err(ReconcileError)`: The first failure; later steps were not attempted
    async fn reconcile(&self, desired: &DesiredState) -> Result<Outcome, ReconcileError>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
