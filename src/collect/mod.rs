//! Resilient paginated collection engine
//!
//! Walks a cursor-paginated API to completeness despite 429 throttling,
//! transport failures and malformed pages.
//!
//! # Overview
//!
//! One `collect` call owns one mutable collection state: the accumulated
//! records, the current cursor and a consecutive-failure counter shared
//! across every recoverable failure class. The engine follows the
//! server-supplied next-page URL verbatim (after the first request it
//! never builds a URL itself) and stops once the accumulated count
//! reaches the server-reported total, or once its retry budget runs out.
//!
//! Recoverable and unrecoverable conditions alike are absorbed locally:
//! `collect` always hands back the records it managed to accumulate,
//! tagged with an explicit [`CollectionStatus`].

mod retry;
mod types;

pub use retry::{RetryPolicy, DEFAULT_BACKOFF, DEFAULT_MAX_RETRIES};
pub use types::{
    AbortReason, CollectObserver, Collection, CollectionStatus, Page, PageLinks, PageMeta,
    TracingObserver,
};

use crate::error::Error;
use crate::http::HttpSession;
use crate::types::Record;
use reqwest::StatusCode;
use std::sync::Arc;

/// Paginated collection engine bound to a shared HTTP session.
pub struct PageCollector {
    session: HttpSession,
    policy: RetryPolicy,
    observer: Arc<dyn CollectObserver>,
}

impl PageCollector {
    /// Create a collector with the default retry policy and a
    /// tracing-backed observer.
    pub fn new(session: HttpSession) -> Self {
        Self {
            session,
            policy: RetryPolicy::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the progress observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CollectObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Get the retry policy in force
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Collect every record reachable from `start_url`.
    ///
    /// Returns the accumulated records in server delivery order with an
    /// explicit completion status; never `Err`. Each record appears
    /// exactly once: pages are appended atomically on successful parse
    /// and a failed fetch is retried against the unchanged URL.
    pub async fn collect(&self, start_url: &str) -> Collection {
        let mut state = CollectionState::new(start_url);

        loop {
            match self.fetch_page(&state.next_url).await {
                FetchOutcome::Page(page) => {
                    self.observer.page_fetched(
                        state.pages + 1,
                        page.data.len(),
                        page.meta.total_items,
                    );
                    let next = page.links.next.clone();
                    state.absorb(page);

                    // Total reached: stop without issuing another request.
                    if state.reached_total() {
                        return state.finish(CollectionStatus::Complete);
                    }

                    // The reported total is still ahead of us; a missing
                    // cursor here means the server cannot deliver it.
                    match next {
                        Some(url) => state.next_url = url,
                        None => {
                            return state.finish(CollectionStatus::Partial {
                                reason: AbortReason::MissingCursor,
                            })
                        }
                    }
                }
                FetchOutcome::RateLimited => {
                    state.consecutive_failures += 1;
                    if !self.policy.should_retry(state.consecutive_failures) {
                        self.observer.budget_exhausted(self.policy.max_retries);
                        return state.finish(CollectionStatus::Partial {
                            reason: AbortReason::RetryBudgetExhausted {
                                max_retries: self.policy.max_retries,
                            },
                        });
                    }
                    let delay = self.policy.backoff_delay();
                    self.observer
                        .rate_limited(state.consecutive_failures, delay);
                    tokio::time::sleep(delay).await;
                }
                FetchOutcome::Transient(err) => {
                    state.consecutive_failures += 1;
                    if !self.policy.should_retry(state.consecutive_failures) {
                        self.observer.budget_exhausted(self.policy.max_retries);
                        return state.finish(CollectionStatus::Partial {
                            reason: AbortReason::RetryBudgetExhausted {
                                max_retries: self.policy.max_retries,
                            },
                        });
                    }
                    let delay = self.policy.backoff_delay();
                    self.observer
                        .transient_error(state.consecutive_failures, &err, delay);
                    tokio::time::sleep(delay).await;
                }
                FetchOutcome::Upstream { status, body } => {
                    self.observer.upstream_error(status, &body);
                    return state.finish(CollectionStatus::Partial {
                        reason: AbortReason::UpstreamError { status },
                    });
                }
            }
        }
    }

    /// One fetch attempt, classified for the engine loop.
    async fn fetch_page(&self, url: &str) -> FetchOutcome {
        let response = match self.session.get(url).await {
            Ok(response) => response,
            Err(err) => return FetchOutcome::Transient(err),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return FetchOutcome::RateLimited;
        }
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return FetchOutcome::Upstream {
                status: status.as_u16(),
                body,
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::Transient(Error::Http(err)),
        };
        match serde_json::from_str::<Page>(&body) {
            Ok(page) => FetchOutcome::Page(page),
            Err(err) => FetchOutcome::Transient(Error::decode(err.to_string())),
        }
    }
}

impl std::fmt::Debug for PageCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCollector")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// One fetch attempt, classified
enum FetchOutcome {
    /// HTTP 200 with a well-formed page body
    Page(Page),
    /// HTTP 429
    RateLimited,
    /// Transport failure or malformed body; shares the 429 retry budget
    Transient(Error),
    /// Any other status; terminal for the collection call
    Upstream { status: u16, body: String },
}

/// Mutable state owned by exactly one in-flight collection call.
struct CollectionState {
    records: Vec<Record>,
    next_url: String,
    /// None until the first successful page reports a total
    total_items: Option<u64>,
    /// Shared across 429s and transport/parse failures; reset only on a
    /// successful fetch
    consecutive_failures: u32,
    pages: usize,
}

impl CollectionState {
    fn new(start_url: &str) -> Self {
        Self {
            records: Vec::new(),
            next_url: start_url.to_string(),
            total_items: None,
            consecutive_failures: 0,
            pages: 0,
        }
    }

    /// Append a page's records, adopt its reported total and reset the
    /// failure counter.
    fn absorb(&mut self, page: Page) {
        self.records.extend(page.data);
        self.total_items = Some(page.meta.total_items);
        self.consecutive_failures = 0;
        self.pages += 1;
    }

    /// An unknown total never reads as reached.
    fn reached_total(&self) -> bool {
        self.total_items
            .is_some_and(|total| self.records.len() as u64 >= total)
    }

    fn finish(self, status: CollectionStatus) -> Collection {
        Collection {
            records: self.records,
            status,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests;
