//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EDR telemetry export and reporting CLI
#[derive(Parser, Debug)]
#[command(name = "edr-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Platform config file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Tenant subdomain (overrides the config file)
    #[arg(long, global = true)]
    pub subdomain: Option<String>,

    /// Platform API auth token (overrides the config file)
    #[arg(long, global = true)]
    pub auth_token: Option<String>,

    /// Platform host the tenant subdomain hangs off (overrides the config file)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every telemetry category and write JSON + CSV reports
    Report {
        /// Directory to save the report artifacts
        #[arg(short, long)]
        output: PathBuf,

        /// Forensic-server YAML auth file; adds a host-inventory sheet
        #[arg(long)]
        inventory_yaml: Option<PathBuf>,
    },

    /// Provision user accounts from a JSON definition file
    Provision {
        /// Path to the user JSON definition file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to save the outcome report
        #[arg(short, long)]
        output: PathBuf,

        /// Email alias addition, e.g. 'ir' turns bob@x into bob+ir@x
        #[arg(long)]
        email_alias: Option<String>,

        /// Default role for records that carry none
        #[arg(long)]
        role: Option<String>,
    },

    /// Validate credentials and connectivity with one page fetch
    Check,
}
