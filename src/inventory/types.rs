//! Inventory server connection config

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_max_rows() -> u64 {
    100_000_000
}

/// Connection settings for the forensic-collection server, loaded from
/// the operator's YAML auth file.
///
/// The three PEM blobs are optional as a set: when all are present the
/// client authenticates with mutual TLS, otherwise a plain client is
/// built (lab deployments behind a trusted proxy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Base URL of the query API, e.g. `https://forensics.example.com:8001`
    pub api_connection_string: String,
    /// Server CA certificate, PEM
    #[serde(default)]
    pub ca_certificate: Option<String>,
    /// Client private key, PEM
    #[serde(default)]
    pub client_private_key: Option<String>,
    /// Client certificate chain, PEM
    #[serde(default)]
    pub client_cert: Option<String>,
    /// Row cap sent with every query
    #[serde(default = "default_max_rows")]
    pub max_rows: u64,
}

impl InventoryConfig {
    /// Load a config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a config from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate required fields and the TLS material set
    pub fn validate(&self) -> Result<()> {
        if self.api_connection_string.is_empty() {
            return Err(Error::missing_field("api_connection_string"));
        }
        let tls_parts = [
            self.ca_certificate.is_some(),
            self.client_private_key.is_some(),
            self.client_cert.is_some(),
        ];
        if tls_parts.iter().any(|present| *present) && !tls_parts.iter().all(|present| *present) {
            return Err(Error::config(
                "ca_certificate, client_private_key and client_cert must be supplied together",
            ));
        }
        Ok(())
    }

    /// Check whether mutual TLS material is configured
    pub fn has_mutual_tls(&self) -> bool {
        self.ca_certificate.is_some()
    }
}
