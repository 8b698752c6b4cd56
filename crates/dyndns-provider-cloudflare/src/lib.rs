// # Cloudflare Record Reconciler
//
// This crate reconciles one A record at Cloudflare with the desired state of a
// dynamic DNS updater.
//
// ## Protocol
//
// Each cycle is a strict sequence of at most three requests, each depending on
// the previous result:
//
// 1. `GET /zones?name={domain}` → first zone whose name equals the domain
// 2. `GET /zones/{zone_id}/dns_records?name={subdomain}.{domain}`
// 3. Depending on what step 2 found:
//    - no record → `POST /zones/{zone_id}/dns_records`
//    - one record, same content → nothing (no write)
//    - one record, other content → `PUT /zones/{zone_id}/dns_records/{record_id}`
//    - several records → abort, the record set is ambiguous
//
// ## Constraints
//
// - ❌ NO retry logic (owned by DyndnsEngine)
// - ❌ NO caching of zones or records between cycles
// - ❌ NO HTTP client of its own (the transport is injected)
// - API token NEVER appears in logs or Debug output
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

pub mod api;

use async_trait::async_trait;
use dyndns_core::traits::{HttpRequest, HttpTransport, Method, Reconciler};
use dyndns_core::{DesiredState, DnsRecord, Operation, Outcome, ReconcileError, RecordPayload, Zone};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

type ReconcileResult<T> = std::result::Result<T, ReconcileError>;

/// Cloudflare reconciler
///
/// Stateless: every call to [`Reconciler::reconcile`] fetches the zone and
/// record afresh. The bearer token comes with the desired state, so one
/// instance serves any token.
pub struct CloudflareReconciler {
    /// HTTP transport for API requests
    transport: Arc<dyn HttpTransport>,

    /// API base URL without trailing slash
    base_url: String,
}

impl std::fmt::Debug for CloudflareReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareReconciler")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CloudflareReconciler {
    /// Create a reconciler talking to the public Cloudflare API
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: CLOUDFLARE_API_BASE.to_string(),
        }
    }

    /// Point the reconciler at another API-compatible base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an authenticated request for `path` (relative to the base URL)
    fn request(&self, method: Method, path: &str, token: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}/{}", self.base_url, path))
            .with_header("Authorization", format!("Bearer {}", token))
            .with_header("Content-Type", "application/json")
    }

    /// Send a request and decode the envelope's `result` for `operation`
    async fn exchange<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: HttpRequest,
    ) -> ReconcileResult<Option<T>> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| api::transport_failed(operation, e))?;

        api::interpret(operation, &response)
    }

    /// Find the zone named exactly like the desired domain
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn resolve_zone(&self, desired: &DesiredState) -> ReconcileResult<Zone> {
        tracing::debug!("Getting available zones for {}", desired.domain);

        let request = self
            .request(Method::Get, "zones", &desired.auth_token)
            .with_query("name", desired.domain.as_str());

        let zones: Vec<Zone> = self
            .exchange(Operation::ZoneLookup, request)
            .await?
            .unwrap_or_default();

        // The name filter is server-side; equality is still checked here, and
        // among duplicates the provider's order decides.
        let zone = zones
            .into_iter()
            .find(|zone| zone.name == desired.domain)
            .ok_or_else(|| ReconcileError::NoMatchingZone {
                domain: desired.domain.clone(),
            })?;

        tracing::debug!("Found zone {} ({})", zone.name, zone.id);
        Ok(zone)
    }

    /// List the records named `hostname` in `zone`
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn find_records(
        &self,
        zone: &Zone,
        hostname: &str,
        token: &str,
    ) -> ReconcileResult<Vec<DnsRecord>> {
        tracing::debug!("Getting DNS records for {} in zone {}", hostname, zone.id);

        let request = self
            .request(Method::Get, &format!("zones/{}/dns_records", zone.id), token)
            .with_query("name", hostname);

        Ok(self
            .exchange(Operation::RecordLookup, request)
            .await?
            .unwrap_or_default())
    }

    /// Create the A record
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// {"type": "A", "name": "home.example.com", "content": "203.0.113.5", "ttl": 1, "proxied": true}
    /// ```
    async fn create_record(&self, zone: &Zone, desired: &DesiredState) -> ReconcileResult<DnsRecord> {
        let payload = RecordPayload::create(desired);
        tracing::info!("Creating new record {} -> {}", payload.name, payload.content);

        let request = self
            .request(
                Method::Post,
                &format!("zones/{}/dns_records", zone.id),
                &desired.auth_token,
            )
            .with_body(encode(Operation::RecordCreate, &payload)?);

        self.exchange(Operation::RecordCreate, request)
            .await?
            .ok_or(ReconcileError::EmptyResult {
                operation: Operation::RecordCreate,
            })
    }

    /// Point the existing record at the target IP
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "home.example.com", "content": "203.0.113.5", "ttl": 300, "proxied": true}
    /// ```
    async fn update_record(
        &self,
        zone: &Zone,
        existing: &DnsRecord,
        desired: &DesiredState,
    ) -> ReconcileResult<DnsRecord> {
        let payload = RecordPayload::update(existing, desired);
        tracing::info!(
            "Updating existing record {} -> {} (was: {})",
            payload.name,
            payload.content,
            existing.content
        );
        if existing.locked {
            tracing::warn!("Record {} is locked, the provider may refuse the update", existing.name);
        }

        // Newer API responses omit zone_id on records
        let zone_id = if existing.zone_id.is_empty() {
            zone.id.as_str()
        } else {
            existing.zone_id.as_str()
        };

        let request = self
            .request(
                Method::Put,
                &format!("zones/{}/dns_records/{}", zone_id, existing.id),
                &desired.auth_token,
            )
            .with_body(encode(Operation::RecordUpdate, &payload)?);

        self.exchange(Operation::RecordUpdate, request)
            .await?
            .ok_or(ReconcileError::EmptyResult {
                operation: Operation::RecordUpdate,
            })
    }
}

fn encode(operation: Operation, payload: &RecordPayload) -> ReconcileResult<Vec<u8>> {
    serde_json::to_vec(payload).map_err(|e| ReconcileError::RequestBuildFailed {
        operation,
        reason: e.to_string(),
    })
}

#[async_trait]
impl Reconciler for CloudflareReconciler {
    async fn reconcile(&self, desired: &DesiredState) -> ReconcileResult<Outcome> {
        let zone = self.resolve_zone(desired).await?;

        let hostname = desired.full_hostname();
        let mut records = self
            .find_records(&zone, &hostname, &desired.auth_token)
            .await?;

        match records.len() {
            0 => {
                let created = self.create_record(&zone, desired).await?;
                tracing::info!("Record {} set to {}", created.name, created.content);
                Ok(Outcome::Created(created))
            }
            1 => {
                let existing = records.remove(0);
                if existing.content == desired.target_content() {
                    tracing::info!("IP not changed since last update ({})", existing.content);
                    return Ok(Outcome::NoChange(existing));
                }

                let updated = self.update_record(&zone, &existing, desired).await?;
                tracing::info!("Record {} set to {}", updated.name, updated.content);
                Ok(Outcome::Updated(updated))
            }
            count => Err(ReconcileError::AmbiguousRecordSet {
                name: hostname,
                count,
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
