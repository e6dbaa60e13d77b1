//! Error types for edr-export
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for edr-export
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited (HTTP 429)")]
    RateLimited,

    #[error("Retry budget ({max_retries}) exhausted")]
    RetryBudgetExhausted { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode page: {message}")]
    Decode { message: String },

    // ============================================================================
    // Inventory Errors
    // ============================================================================
    #[error("Inventory query failed: {message}")]
    Query { message: String },

    // ============================================================================
    // Provisioning Errors
    // ============================================================================
    #[error("Provisioning failed for '{user}': {message}")]
    Provision { user: String, message: String },

    // ============================================================================
    // Report Errors
    // ============================================================================
    #[error("Report error: {message}")]
    Report { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an inventory query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a provisioning error
    pub fn provision(user: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provision {
            user: user.into(),
            message: message.into(),
        }
    }

    /// Create a report error
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }

    /// Check if this error is transient (retryable within a collection call)
    ///
    /// Rate limiting, transport failures and malformed pages share one retry
    /// budget; any other HTTP status is terminal for the collection call.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited | Error::Decode { .. } => true,
            Error::HttpStatus { status, .. } => *status == 429,
            _ => false,
        }
    }
}

/// Result type alias for edr-export
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("auth_token");
        assert_eq!(err.to_string(), "Missing required config field: auth_token");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::RetryBudgetExhausted { max_retries: 10 };
        assert_eq!(err.to_string(), "Retry budget (10) exhausted");
    }

    #[test]
    fn test_is_transient() {
        assert!(Error::RateLimited.is_transient());
        assert!(Error::decode("truncated body").is_transient());
        assert!(Error::http_status(429, "").is_transient());

        assert!(!Error::http_status(500, "").is_transient());
        assert!(!Error::http_status(401, "").is_transient());
        assert!(!Error::config("test").is_transient());
        assert!(!Error::query("closed channel").is_transient());
    }
}
