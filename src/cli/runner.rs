//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::edr::{Client, PlatformConfig};
use crate::error::{Error, Result};
use crate::inventory::InventoryClient;
use crate::provision::UserSpec;
use crate::report::{save_reports, ReportData};
use crate::types::Record;
use std::path::Path;
use tracing::{error, info, warn};

/// Name of the report sheet holding forensic-server host inventory
const INVENTORY_SHEET: &str = "host_inventory";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Report {
                output,
                inventory_yaml,
            } => self.report(output, inventory_yaml.as_deref()).await,
            Commands::Provision {
                input,
                output,
                email_alias,
                role,
            } => {
                self.provision(input, output, email_alias.as_deref(), role.as_deref())
                    .await
            }
            Commands::Check => self.check().await,
        }
    }

    /// Resolve the platform config from the config file and flag
    /// overrides. Flags win over the file; with no file, the subdomain,
    /// auth token and host flags are all required.
    fn load_platform_config(&self) -> Result<PlatformConfig> {
        let mut config = if let Some(path) = &self.cli.config {
            PlatformConfig::from_file(path)?
        } else {
            PlatformConfig::new(
                self.cli
                    .subdomain
                    .clone()
                    .ok_or_else(|| Error::missing_field("subdomain"))?,
                self.cli
                    .auth_token
                    .clone()
                    .ok_or_else(|| Error::missing_field("auth_token"))?,
                self.cli
                    .host
                    .clone()
                    .ok_or_else(|| Error::missing_field("host"))?,
            )
        };

        if let Some(subdomain) = &self.cli.subdomain {
            config.subdomain = subdomain.clone();
        }
        if let Some(auth_token) = &self.cli.auth_token {
            config.auth_token = auth_token.clone();
        }
        if let Some(host) = &self.cli.host {
            config.host = host.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Collect every category, optionally merge host inventory, write
    /// the report artifacts.
    async fn report(&self, output: &Path, inventory_yaml: Option<&Path>) -> Result<()> {
        let config = self.load_platform_config()?;
        let subdomain = config.subdomain.clone();
        let client = Client::new(config)?;

        info!("Collecting information for subdomain: {subdomain}");
        let reporter = client.reporter();
        let results = reporter.collect_all().await;

        let mut data: ReportData = Vec::with_capacity(results.len() + 1);
        for result in results {
            if result.collection.is_complete() {
                info!(
                    "Collected {} {} records",
                    result.collection.len(),
                    result.category
                );
            } else {
                warn!(
                    "Collected {} {} records before giving up ({:?})",
                    result.collection.len(),
                    result.category,
                    result.collection.status
                );
            }
            data.push((
                result.category.name().to_string(),
                result.collection.records,
            ));
        }

        if let Some(yaml_path) = inventory_yaml {
            info!("Collecting information for forensic-server host inventory");
            match self.fetch_inventory(yaml_path).await {
                Ok(rows) => data.push((INVENTORY_SHEET.to_string(), rows)),
                Err(err) => error!("Host inventory collection failed: {err}"),
            }
        }

        let paths = save_reports(&data, output, &subdomain)?;
        info!("Report complete: {}", paths.json.display());
        Ok(())
    }

    async fn fetch_inventory(&self, yaml_path: &Path) -> Result<Vec<Record>> {
        let client = InventoryClient::from_yaml_file(yaml_path)?;
        client.clients().await
    }

    /// Provision users from a JSON definition file and write the outcome
    /// report.
    async fn provision(
        &self,
        input: &Path,
        output: &Path,
        email_alias: Option<&str>,
        role: Option<&str>,
    ) -> Result<()> {
        let config = self.load_platform_config()?;
        let subdomain = config.subdomain.clone();
        let client = Client::new(config)?;

        let content = std::fs::read_to_string(input).map_err(|_| Error::FileNotFound {
            path: input.display().to_string(),
        })?;
        let mut users: Vec<UserSpec> = serde_json::from_str(&content)?;

        if let Some(alias) = email_alias {
            users = users
                .into_iter()
                .map(|user| user.with_email_alias(alias))
                .collect();
        }

        info!(
            "Provisioning {} user accounts to subdomain: {subdomain}",
            users.len()
        );
        let outcome = client.provisioner().create_users(&users, role).await;

        let summary = format!(
            "Completed provisioning. Created {} user accounts, and failed to create {} user accounts",
            outcome.success.len(),
            outcome.failed.len()
        );
        if outcome.failed.is_empty() {
            info!("{summary}");
        } else if outcome.success.is_empty() {
            error!("{summary}");
        } else {
            warn!("{summary}");
        }

        let data: ReportData = vec![
            (
                "success".to_string(),
                outcome
                    .success
                    .iter()
                    .map(|user| serde_json::to_value(user).unwrap_or_default())
                    .collect(),
            ),
            (
                "failed".to_string(),
                outcome
                    .failed
                    .iter()
                    .map(|failed| serde_json::to_value(failed).unwrap_or_default())
                    .collect(),
            ),
        ];
        let paths = save_reports(&data, output, &subdomain)?;
        info!("Provisioning report saved: {}", paths.json.display());
        Ok(())
    }

    /// One cheap authenticated fetch to validate credentials.
    async fn check(&self) -> Result<()> {
        let config = self.load_platform_config()?;
        let client = Client::new(config)?;

        client.reporter().check().await?;
        info!("Connection successful");
        Ok(())
    }
}
