//! Platform configuration and telemetry categories

use crate::collect::RetryPolicy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default page size requested from the platform
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Connection settings for the incident-response platform.
///
/// Loadable from a JSON file or assembled from CLI flags. The auth token
/// is embedded in request URLs by the platform's API contract, so it is
/// never logged; see `http::redact_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Tenant subdomain, e.g. "acme"
    pub subdomain: String,
    /// API auth token
    pub auth_token: String,
    /// Platform host the tenant subdomain hangs off, e.g. "ir.example.com"
    pub host: String,
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Retry budget per collection call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed backoff between recoverable failures, in seconds
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_retries() -> u32 {
    crate::collect::DEFAULT_MAX_RETRIES
}

fn default_backoff_secs() -> u64 {
    crate::collect::DEFAULT_BACKOFF.as_secs()
}

impl PlatformConfig {
    /// Build a config with defaults for everything but the credentials
    pub fn new(
        subdomain: impl Into<String>,
        auth_token: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            subdomain: subdomain.into(),
            auth_token: auth_token.into(),
            host: host.into(),
            page_size: default_page_size(),
            max_retries: default_max_retries(),
            backoff_secs: default_backoff_secs(),
        }
    }

    /// Load a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<()> {
        if self.subdomain.is_empty() {
            return Err(Error::missing_field("subdomain"));
        }
        if self.auth_token.is_empty() {
            return Err(Error::missing_field("auth_token"));
        }
        if self.host.is_empty() {
            return Err(Error::missing_field("host"));
        }
        if self.page_size == 0 {
            return Err(Error::config("page_size must be at least 1"));
        }
        Ok(())
    }

    /// The API root for this tenant
    pub fn api_root(&self) -> String {
        format!("https://{}.{}", self.subdomain, self.host)
    }

    /// The retry policy this config asks for
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.backoff_secs))
    }
}

/// One telemetry category collected from the platform.
///
/// Each category is an independent collection call: its own state, its
/// own retry budget, its own outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Monitored endpoints
    Endpoints,
    /// Users observed on endpoints
    EndpointUsers,
    /// Audit trail of console activity
    AuditLogs,
    /// Confirmed detections
    Detections,
    /// Raw telemetry events
    Events,
    /// Indicators of compromise flagged on detections
    MarkedIndicators,
}

impl Category {
    /// Every category, in report order
    pub const ALL: [Category; 6] = [
        Category::Endpoints,
        Category::EndpointUsers,
        Category::AuditLogs,
        Category::Detections,
        Category::Events,
        Category::MarkedIndicators,
    ];

    /// Stable name used as the report sheet key
    pub fn name(self) -> &'static str {
        match self {
            Category::Endpoints => "endpoints",
            Category::EndpointUsers => "endpoint_users",
            Category::AuditLogs => "audit_logs",
            Category::Detections => "detections",
            Category::Events => "events",
            Category::MarkedIndicators => "marked_indicators_of_compromise",
        }
    }

    /// Resource path under `/openapi/v3/`
    pub fn resource(self) -> &'static str {
        match self {
            Category::MarkedIndicators => "detections/marked_indicators_of_compromise",
            other => other.name(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The outcome of collecting one category
#[derive(Debug, Clone)]
pub struct CategoryCollection {
    /// Which category was collected
    pub category: Category,
    /// Records plus completion status
    pub collection: crate::collect::Collection,
}
