//! Configuration for the dynamic DNS updater
//!
//! The updater is configured from the environment. The variable names are the
//! ones existing deployments already use:
//!
//! - `CF_token`: Cloudflare API token (required)
//! - `Domain`: zone apex, e.g. `example.com` (required)
//! - `Subdomain`: host label(s) below the apex, e.g. `home` (required)
//! - `CF_proxy_disabled`: when present, the record is not proxied
//!
//! Interval and IP discovery URL come from the daemon's flags.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API token
pub const ENV_TOKEN: &str = "CF_token";
/// Environment variable holding the zone apex
pub const ENV_DOMAIN: &str = "Domain";
/// Environment variable holding the subdomain
pub const ENV_SUBDOMAIN: &str = "Subdomain";
/// Environment variable whose presence disables proxying
pub const ENV_PROXY_DISABLED: &str = "CF_proxy_disabled";

/// Default IP discovery endpoint
pub const DEFAULT_IP_URL: &str = "https://api.ipify.org?format=json";

/// Main configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DyndnsConfig {
    /// Cloudflare API token (never logged)
    pub api_token: String,

    /// Zone apex
    pub domain: String,

    /// Host label(s) below the apex
    pub subdomain: String,

    /// Whether the record is proxied through Cloudflare
    #[serde(default = "default_proxied")]
    pub proxied: bool,

    /// URL returning `{"ip": "..."}`
    #[serde(default = "default_ip_url")]
    pub ip_url: String,

    /// Seconds between reconciliation cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl std::fmt::Debug for DyndnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DyndnsConfig")
            .field("api_token", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("subdomain", &self.subdomain)
            .field("proxied", &self.proxied)
            .field("ip_url", &self.ip_url)
            .field("interval_secs", &self.interval_secs)
            .field("event_channel_capacity", &self.event_channel_capacity)
            .finish()
    }
}

impl DyndnsConfig {
    /// Create a configuration with defaults for everything but the record
    pub fn new(
        api_token: impl Into<String>,
        domain: impl Into<String>,
        subdomain: impl Into<String>,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            domain: domain.into(),
            subdomain: subdomain.into(),
            proxied: default_proxied(),
            ip_url: default_ip_url(),
            interval_secs: default_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| crate::Error::config(format!("{} not set", key)))
        };

        let mut config = Self::new(
            required(ENV_TOKEN)?,
            required(ENV_DOMAIN)?,
            required(ENV_SUBDOMAIN)?,
        );
        config.proxied = lookup(ENV_PROXY_DISABLED).is_none();

        Ok(config)
    }

    /// Set the interval between cycles
    ///
    /// The interval is kept in whole seconds; a partial second rounds up, so
    /// only `Duration::ZERO` yields the zero interval `validate` rejects.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_secs = interval.as_secs() + u64::from(interval.subsec_nanos() > 0);
        self
    }

    /// Set the IP discovery URL
    pub fn with_ip_url(mut self, url: impl Into<String>) -> Self {
        self.ip_url = url.into();
        self
    }

    /// Interval between cycles
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// `subdomain.domain`
    pub fn full_hostname(&self) -> String {
        format!("{}.{}", self.subdomain, self.domain)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.trim().is_empty() {
            return Err(crate::Error::config(format!("{} cannot be empty", ENV_TOKEN)));
        }

        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.api_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower == "token"
        {
            return Err(crate::Error::config(format!(
                "{} appears to be a placeholder. Use an actual API token.",
                ENV_TOKEN
            )));
        }

        validate_domain_name(&self.domain)?;
        if !self.domain.contains('.') {
            return Err(crate::Error::config(format!(
                "{} must be a registered domain such as example.com. Got: {}",
                ENV_DOMAIN, self.domain
            )));
        }
        validate_domain_name(&self.subdomain)?;
        validate_domain_name(&self.full_hostname())?;

        if self.interval_secs == 0 {
            return Err(crate::Error::config("Update interval must be > 0"));
        }

        if !self.ip_url.starts_with("https://") && !self.ip_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "IP discovery URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_url
            )));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: total length, label length, characters, hyphen
/// placement. Not comprehensive but catches common errors.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_proxied() -> bool {
    true
}

fn default_ip_url() -> String {
    DEFAULT_IP_URL.to_string()
}

// Two hours
fn default_interval_secs() -> u64 {
    2 * 60 * 60
}

fn default_event_channel_capacity() -> usize {
    100
}
