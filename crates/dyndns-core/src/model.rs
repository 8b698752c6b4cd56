//! Data model shared by the reconciler, the engine and the tests
//!
//! All of these are transient: they are rebuilt from configuration and provider
//! responses on every cycle and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Record type managed by the updater
pub const A_RECORD: &str = "A";

/// Cloudflare's "automatic" TTL
pub const AUTOMATIC_TTL: u32 = 1;

/// What the DNS record should look like after a cycle
///
/// The Debug implementation never exposes the auth token.
#[derive(Clone, PartialEq, Eq)]
pub struct DesiredState {
    /// Zone apex, e.g. `example.com`
    pub domain: String,
    /// Label(s) below the apex, e.g. `home`
    pub subdomain: String,
    /// Address to publish
    pub target_ip: Ipv4Addr,
    /// Whether the record is proxied by the provider
    pub proxied: bool,
    /// Static bearer token
    pub auth_token: String,
}

impl DesiredState {
    /// `subdomain.domain`
    pub fn full_hostname(&self) -> String {
        format!("{}.{}", self.subdomain, self.domain)
    }

    /// The record content the target IP publishes as
    pub fn target_content(&self) -> String {
        self.target_ip.to_string()
    }
}

impl fmt::Debug for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesiredState")
            .field("domain", &self.domain)
            .field("subdomain", &self.subdomain)
            .field("target_ip", &self.target_ip)
            .field("proxied", &self.proxied)
            .field("auth_token", &"<REDACTED>")
            .finish()
    }
}

/// A DNS zone as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// One DNS record as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(default)]
    pub zone_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    /// The published address; the only source of truth for it
    pub content: String,
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default)]
    pub proxiable: bool,
    #[serde(default)]
    pub locked: bool,
}

/// Body of a create or update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

impl RecordPayload {
    /// Payload for a brand new A record
    pub fn create(desired: &DesiredState) -> Self {
        Self {
            record_type: A_RECORD.to_string(),
            name: desired.full_hostname(),
            content: desired.target_content(),
            ttl: AUTOMATIC_TTL,
            proxied: desired.proxied,
        }
    }

    /// Payload for updating `existing`: name, ttl and type are kept, content
    /// and proxied come from the desired state
    pub fn update(existing: &DnsRecord, desired: &DesiredState) -> Self {
        Self {
            record_type: existing.record_type.clone(),
            name: existing.name.clone(),
            content: desired.target_content(),
            ttl: existing.ttl,
            proxied: desired.proxied,
        }
    }
}

/// An entry of the provider's `errors` or `messages` arrays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub code: i64,
    pub message: String,
}

/// Result of a successful reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record already published the target IP; nothing was written
    NoChange(DnsRecord),
    /// No record existed and one was created
    Created(DnsRecord),
    /// The record existed with another IP and was updated
    Updated(DnsRecord),
}

impl Outcome {
    /// The record as the provider last reported it
    pub fn record(&self) -> &DnsRecord {
        match self {
            Outcome::NoChange(record) | Outcome::Created(record) | Outcome::Updated(record) => {
                record
            }
        }
    }
}
