//! Incident-response platform client
//!
//! Thin client over the platform's paginated REST API: one start URL per
//! telemetry category, with the walk itself delegated to the collection
//! engine. The auth token travels in the URL query string per the
//! platform's API contract. Only the first URL is built here; every
//! subsequent page URL comes from the server.

mod types;

pub use types::{Category, CategoryCollection, PlatformConfig, DEFAULT_PAGE_SIZE};

use crate::collect::{CollectObserver, Collection, PageCollector};
use crate::error::Result;
use crate::http::{HttpSession, HttpSessionConfig};
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Authenticated client for one platform tenant.
pub struct Client {
    config: PlatformConfig,
    session: HttpSession,
}

impl Client {
    /// Create a client with a default session
    pub fn new(config: PlatformConfig) -> Result<Self> {
        Self::with_session(config, HttpSession::with_config(HttpSessionConfig::default()))
    }

    /// Create a client over an existing session
    pub fn with_session(config: PlatformConfig, session: HttpSession) -> Result<Self> {
        config.validate()?;
        // Reject hosts that cannot form a URL before any request goes out.
        Url::parse(&config.api_root())?;
        Ok(Self { config, session })
    }

    /// The tenant config
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// The shared session
    pub fn session(&self) -> &HttpSession {
        &self.session
    }

    /// Build a telemetry reporter sharing this client's session
    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.config.clone(), self.session.clone())
    }

    /// Build a user provisioner sharing this client's session
    pub fn provisioner(&self) -> crate::provision::Provisioner {
        crate::provision::Provisioner::new(
            self.config.api_root(),
            self.config.auth_token.clone(),
            self.session.clone(),
        )
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("subdomain", &self.config.subdomain)
            .field("host", &self.config.host)
            .finish_non_exhaustive()
    }
}

/// Collects telemetry categories from one tenant.
pub struct Reporter {
    config: PlatformConfig,
    api_root: String,
    session: HttpSession,
    collector: PageCollector,
}

impl Reporter {
    /// Create a reporter over a shared session
    pub fn new(config: PlatformConfig, session: HttpSession) -> Self {
        let api_root = config.api_root();
        let collector = PageCollector::new(session.clone()).with_policy(config.retry_policy());
        Self {
            config,
            api_root,
            session,
            collector,
        }
    }

    /// Override the API root (self-hosted deployments, tests)
    #[must_use]
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    /// Replace the collection engine's progress observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CollectObserver>) -> Self {
        self.collector = self.collector.with_observer(observer);
        self
    }

    /// The start URL for a category; later pages come from the server.
    fn start_url(&self, category: Category) -> String {
        format!(
            "{}/openapi/v3/{}?auth_token={}&per_page={}",
            self.api_root.trim_end_matches('/'),
            category.resource(),
            self.config.auth_token,
            self.config.page_size
        )
    }

    /// Validate credentials and connectivity with a single one-record
    /// page fetch. No pagination is followed.
    pub async fn check(&self) -> Result<()> {
        let url = format!(
            "{}/openapi/v3/{}?auth_token={}&per_page=1",
            self.api_root.trim_end_matches('/'),
            Category::Endpoints.resource(),
            self.config.auth_token
        );
        let response = self.session.get(&url).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(crate::error::Error::http_status(status.as_u16(), body))
        }
    }

    /// Collect one category to completeness or give-up
    pub async fn collect(&self, category: Category) -> Collection {
        info!(
            "Collecting {category} for subdomain: {}",
            self.config.subdomain
        );
        self.collector.collect(&self.start_url(category)).await
    }

    /// Collect every category sequentially.
    ///
    /// Categories are independent: each gets its own collection state and
    /// a partial outcome in one never aborts the rest.
    pub async fn collect_all(&self) -> Vec<CategoryCollection> {
        let mut results = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let collection = self.collect(category).await;
            results.push(CategoryCollection {
                category,
                collection,
            });
        }
        results
    }

    /// Monitored endpoints
    pub async fn endpoints(&self) -> Collection {
        self.collect(Category::Endpoints).await
    }

    /// Users observed on endpoints
    pub async fn endpoint_users(&self) -> Collection {
        self.collect(Category::EndpointUsers).await
    }

    /// Audit trail of console activity
    pub async fn audit_logs(&self) -> Collection {
        self.collect(Category::AuditLogs).await
    }

    /// Confirmed detections
    pub async fn detections(&self) -> Collection {
        self.collect(Category::Detections).await
    }

    /// Raw telemetry events
    pub async fn events(&self) -> Collection {
        self.collect(Category::Events).await
    }

    /// Indicators of compromise flagged on detections
    pub async fn marked_indicators_of_compromise(&self) -> Collection {
        self.collect(Category::MarkedIndicators).await
    }
}
