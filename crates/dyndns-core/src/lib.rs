// # dyndns-core
//
// Core library for the Cloudflare dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides everything but the provider-specific protocol:
// - **HttpTransport**: Injected HTTP capability (reqwest in production, scripted in tests)
// - **IpSource**: Trait for discovering the current public IPv4 address
// - **Reconciler**: Trait for bringing a DNS record in line with the desired state
// - **DyndnsEngine**: Timer-driven loop running one reconciliation cycle per tick
// - **Model**: DesiredState, Zone, DnsRecord, RecordPayload, Outcome
//
// ## Design Principles
//
// 1. **Separation of Concerns**: The engine schedules, the reconciler decides
// 2. **Injected Transport**: No global HTTP client; every network call goes through `HttpTransport`
// 3. **Explicit Errors**: Every failure is a typed value returned to the engine, never a panic
// 4. **Idempotency**: Reconciling an unchanged IP never writes
// 5. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod traits;
pub mod transport;

// Re-export core types for convenience
pub use config::DyndnsConfig;
pub use engine::{DyndnsEngine, EngineEvent};
pub use error::{Error, Operation, ReconcileError, Result};
pub use model::{ApiMessage, DesiredState, DnsRecord, Outcome, RecordPayload, Zone};
pub use traits::{HttpRequest, HttpResponse, HttpTransport, IpSource, Method, Reconciler, TransportError};
pub use transport::ReqwestTransport;
