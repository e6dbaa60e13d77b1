//! Forensic-collection server query client
//!
//! A thin single-shot executor: one authenticated POST per query, one
//! JSON response, no pagination and no retry. Failures propagate to the
//! caller, which decides whether the run continues without inventory
//! data.

mod types;

pub use types::InventoryConfig;

use crate::error::{Error, Result};
use crate::types::Record;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Host-inventory query run by [`InventoryClient::clients`].
pub const CLIENT_INFO_QUERY: &str = "\
SELECT \
    os_info as OSINFO, \
    os_info.fqdn as Hostname, \
    os_info.release as OS, \
    os_info.machine as Architecture, \
    first_seen_at as FirstSeen, \
    (last_seen_at / 1000) as LastSeen, \
    client_id as ClientId \
FROM clients() \
ORDER BY LastSeen DESC";

/// Something that can execute one inventory query.
///
/// The seam exists so report assembly can be exercised without a live
/// forensic server.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run one query and return its rows
    async fn query(&self, query: &str) -> Result<Vec<Record>>;
}

/// HTTPS query client for the forensic-collection server.
pub struct InventoryClient {
    config: InventoryConfig,
    client: reqwest::Client,
}

impl InventoryClient {
    /// Build a client from a connection config.
    ///
    /// When the config carries mutual-TLS material the client presents
    /// the operator identity and pins the server CA.
    pub fn new(config: InventoryConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(format!("edr-export/{}", env!("CARGO_PKG_VERSION")));

        if config.has_mutual_tls() {
            let ca = config
                .ca_certificate
                .as_deref()
                .ok_or_else(|| Error::missing_field("ca_certificate"))?;
            let key = config
                .client_private_key
                .as_deref()
                .ok_or_else(|| Error::missing_field("client_private_key"))?;
            let cert = config
                .client_cert
                .as_deref()
                .ok_or_else(|| Error::missing_field("client_cert"))?;

            let ca = reqwest::Certificate::from_pem(ca.as_bytes())
                .map_err(|e| Error::config(format!("Invalid CA certificate: {e}")))?;
            let identity = reqwest::Identity::from_pem(format!("{cert}\n{key}").as_bytes())
                .map_err(|e| Error::config(format!("Invalid client identity: {e}")))?;

            builder = builder
                .add_root_certificate(ca)
                .identity(identity)
                .use_rustls_tls();
        }

        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build inventory client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Load the YAML auth file and build a client in one step
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::new(InventoryConfig::from_yaml_file(path)?)
    }

    fn query_url(&self) -> String {
        format!(
            "{}/api/v1/query",
            self.config.api_connection_string.trim_end_matches('/')
        )
    }

    /// Run the fixed host-inventory query
    pub async fn clients(&self) -> Result<Vec<Record>> {
        self.query(CLIENT_INFO_QUERY).await
    }
}

#[async_trait]
impl QueryExecutor for InventoryClient {
    async fn query(&self, query: &str) -> Result<Vec<Record>> {
        let body = json!({
            "query": query,
            "max_rows": self.config.max_rows,
        });

        debug!("Inventory query against {}", self.query_url());
        let response = self
            .client
            .post(self.query_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::query(format!("HTTP {}: {body}", status.as_u16())));
        }

        let rows: Vec<Record> = response
            .json()
            .await
            .map_err(|e| Error::query(format!("Malformed response: {e}")))?;
        Ok(rows)
    }
}

impl std::fmt::Debug for InventoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryClient")
            .field("api_connection_string", &self.config.api_connection_string)
            .field("mutual_tls", &self.config.has_mutual_tls())
            .finish_non_exhaustive()
    }
}
