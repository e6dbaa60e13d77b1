//! HTTP session implementation

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::Result;
use reqwest::{Client, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP session
#[derive(Debug, Clone)]
pub struct HttpSessionConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
    /// Rate limiter configuration (None disables client-side throttling)
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpSessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("edr-export/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: Some(RateLimiterConfig::default()),
        }
    }
}

impl HttpSessionConfig {
    /// Create a new config builder
    pub fn builder() -> HttpSessionConfigBuilder {
        HttpSessionConfigBuilder::default()
    }
}

/// Builder for session config
#[derive(Default)]
pub struct HttpSessionConfigBuilder {
    config: HttpSessionConfig,
}

impl HttpSessionConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Build the config
    pub fn build(self) -> HttpSessionConfig {
        self.config
    }
}

/// Pre-configured HTTP session, safe for sequential reuse across
/// collection calls. Cloning shares the underlying connection pool and
/// rate limiter.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    config: HttpSessionConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpSession {
    /// Create a session with default configuration
    pub fn new() -> Self {
        Self::with_config(HttpSessionConfig::default())
    }

    /// Create a session with custom configuration
    pub fn with_config(config: HttpSessionConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Self {
            client,
            config,
            rate_limiter,
        }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Check if client-side rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Issue a GET to an absolute URL.
    ///
    /// Returns the response whatever its status; only transport failures
    /// surface as `Err`. Callers classify 200/429/other themselves.
    pub async fn get(&self, url: &str) -> Result<Response> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self.client.get(url);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await?;
        debug!("GET {} -> {}", redact_url(url), response.status());
        Ok(response)
    }

    /// Issue a POST with a JSON body to an absolute URL.
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Response> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self.client.post(url).json(body);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await?;
        debug!("POST {} -> {}", redact_url(url), response.status());
        Ok(response)
    }
}

impl Default for HttpSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Strip query parameters before a URL reaches a log line; the platform
/// embeds the auth token in the query string.
pub fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.query().is_some() {
                parsed.set_query(None);
                format!("{parsed}?<redacted>")
            } else {
                parsed.to_string()
            }
        }
        Err(_) => url.to_string(),
    }
}
