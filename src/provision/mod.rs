//! User provisioning against the platform
//!
//! One create-call per input record, issued sequentially over the shared
//! session. Failures never abort the run; each outcome is aggregated and
//! the failed records carry the error that sank them.

mod types;

pub use types::{FailedUser, ProvisionOutcome, UserSpec};

use crate::error::{Error, Result};
use crate::http::HttpSession;
use serde_json::json;
use tracing::info;

/// Provisions user accounts on one platform tenant.
pub struct Provisioner {
    api_root: String,
    auth_token: String,
    session: HttpSession,
}

impl Provisioner {
    /// Create a provisioner over a shared session
    pub fn new(
        api_root: impl Into<String>,
        auth_token: impl Into<String>,
        session: HttpSession,
    ) -> Self {
        Self {
            api_root: api_root.into(),
            auth_token: auth_token.into(),
            session,
        }
    }

    fn users_url(&self) -> String {
        format!(
            "{}/openapi/v3/users?auth_token={}",
            self.api_root.trim_end_matches('/'),
            self.auth_token
        )
    }

    /// Create a single user.
    ///
    /// `default_role` is used when the record carries no role of its own;
    /// a record with neither is rejected before any request goes out.
    pub async fn create_user(&self, user: &UserSpec, default_role: Option<&str>) -> Result<()> {
        let role = user
            .role_name
            .as_deref()
            .or(default_role)
            .ok_or_else(|| {
                Error::provision(
                    &user.email_address,
                    "Role name was not provided and no default role is set",
                )
            })?;

        let body = json!({
            "first_name": user.first_name,
            "last_name": user.last_name,
            "email_address": user.email_address,
            "role_name": role,
        });

        let response = self.session.post_json(&self.users_url(), &body).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        info!(
            "Created user {}, {} <{}>",
            user.last_name, user.first_name, user.email_address
        );
        Ok(())
    }

    /// Create every user, aggregating per-record outcomes.
    pub async fn create_users(
        &self,
        users: &[UserSpec],
        default_role: Option<&str>,
    ) -> ProvisionOutcome {
        let mut outcome = ProvisionOutcome::default();

        for user in users {
            match self.create_user(user, default_role).await {
                Ok(()) => outcome.success.push(user.clone()),
                Err(err) => outcome.failed.push(FailedUser {
                    user: user.clone(),
                    error: err.to_string(),
                }),
            }
        }

        outcome
    }
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("api_root", &self.api_root)
            .finish_non_exhaustive()
    }
}
