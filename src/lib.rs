//! # edr-export
//!
//! Batch telemetry export and reporting for incident-response
//! engagements.
//!
//! The crate walks a cursor-paginated EDR platform API to completeness
//! despite 429 throttling, transport failures and malformed pages;
//! queries a forensic-collection server for host inventory; provisions
//! platform users; and renders the results to JSON and CSV reports.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use edr_export::edr::{Client, PlatformConfig};
//! use edr_export::report::save_reports;
//!
//! #[tokio::main]
//! async fn main() -> edr_export::Result<()> {
//!     let config = PlatformConfig::new("acme", "auth-token", "ir.example.com");
//!     let client = Client::new(config)?;
//!
//!     let results = client.reporter().collect_all().await;
//!     let data = results
//!         .into_iter()
//!         .map(|r| (r.category.name().to_string(), r.collection.records))
//!         .collect();
//!     save_reports(&data, "out", "acme")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          CLI                                │
//! │        report          provision          check             │
//! └─────────────────────────────────────────────────────────────┘
//!                │
//! ┌──────────┬───┴───────┬──────────────┬────────────┬──────────┐
//! │   edr    │  collect  │  provision   │ inventory  │  report  │
//! ├──────────┼───────────┼──────────────┼────────────┼──────────┤
//! │ Client   │ Cursor    │ One create   │ Single-    │ Flatten  │
//! │ Reporter │ following │ call per     │ shot query │ JSON     │
//! │ Category │ Retry     │ record       │ (mTLS)     │ CSV      │
//! │          │ Backoff   │ Aggregation  │            │ sheets   │
//! └──────────┴───────────┴──────────────┴────────────┴──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP session shared across collection calls
pub mod http;

/// Resilient paginated collection engine
pub mod collect;

/// Incident-response platform client
pub mod edr;

/// User provisioning against the platform
pub mod provision;

/// Forensic-collection server query client
pub mod inventory;

/// Report rendering
pub mod report;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use collect::{Collection, CollectionStatus, PageCollector, RetryPolicy};
pub use edr::{Category, Client, PlatformConfig, Reporter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
