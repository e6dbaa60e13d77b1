//! User provisioning types

use serde::{Deserialize, Serialize};

/// One user account to provision on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSpec {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login email address
    pub email_address: String,
    /// Platform role; falls back to the run-wide default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

impl UserSpec {
    /// Rewrite `bob@example.com` with alias `ir` to `bob+ir@example.com`.
    ///
    /// Addresses without exactly one `@` are left unchanged.
    #[must_use]
    pub fn with_email_alias(mut self, alias: &str) -> Self {
        let parts: Vec<&str> = self.email_address.splitn(2, '@').collect();
        if let [local, domain] = parts.as_slice() {
            if !domain.is_empty() && !local.is_empty() {
                self.email_address = format!("{local}+{alias}@{domain}");
            }
        }
        self
    }
}

/// A user that could not be provisioned, with the error attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedUser {
    /// The input record
    #[serde(flatten)]
    pub user: UserSpec,
    /// Why provisioning failed
    pub error: String,
}

/// Aggregated outcome of a provisioning run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionOutcome {
    /// Users created on the platform
    pub success: Vec<UserSpec>,
    /// Users the platform rejected, or that failed validation
    pub failed: Vec<FailedUser>,
}

impl ProvisionOutcome {
    /// Check that every user was created
    pub fn is_all_created(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total input records processed
    pub fn total(&self) -> usize {
        self.success.len() + self.failed.len()
    }
}
