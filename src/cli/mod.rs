//! CLI module
//!
//! Command-line interface for running exports.
//!
//! # Commands
//!
//! - `report` - Collect every telemetry category and write reports
//! - `provision` - Provision platform users from a JSON definition file
//! - `check` - Validate credentials with one cheap page fetch

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
