//! Collection engine types
//!
//! The wire shape of a page, the result of a collection call and the
//! observer seam for progress reporting.

use crate::error::Error;
use crate::types::Record;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

// ============================================================================
// Page wire shape
// ============================================================================

/// One page of a paginated response.
///
/// Only the fields the engine needs are modeled; record contents stay
/// opaque. A 200 body that does not deserialize into this shape counts as
/// a transient failure, the same as a transport error.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Records in server delivery order
    pub data: Vec<Record>,
    /// Cursor block; `next` is null or absent on the last page
    pub links: PageLinks,
    /// Server-reported totals
    pub meta: PageMeta,
}

/// Cursor block of a page
#[derive(Debug, Clone, Deserialize)]
pub struct PageLinks {
    /// Opaque URL of the next page, followed verbatim
    pub next: Option<String>,
}

/// Metadata block of a page
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    /// Total number of items across all pages, as last reported
    pub total_items: u64,
}

// ============================================================================
// Collection result
// ============================================================================

/// Why a collection call stopped before reaching the reported total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Consecutive recoverable failures exceeded the retry budget
    RetryBudgetExhausted {
        /// The configured budget
        max_retries: u32,
    },
    /// The server answered with a non-transient status
    UpstreamError {
        /// HTTP status code
        status: u16,
    },
    /// The server stopped supplying a cursor before the reported total
    /// was reached
    MissingCursor,
}

/// Completion status of a collection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Every record the server reported was accumulated
    Complete,
    /// Collection gave up early; records hold whatever was accumulated
    Partial {
        /// Why collection stopped
        reason: AbortReason,
    },
}

/// The outcome of one collection call: the accumulated records in server
/// delivery order, plus an explicit completion status.
///
/// `collect` never returns `Err`; callers that only care about the
/// records can read `.records` and ignore the status.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Accumulated records, append-only, server order
    pub records: Vec<Record>,
    /// Whether the reported total was reached
    pub status: CollectionStatus,
    /// Number of successfully parsed pages
    pub pages: usize,
}

impl Collection {
    /// Check whether the reported total was reached
    pub fn is_complete(&self) -> bool {
        matches!(self.status, CollectionStatus::Complete)
    }

    /// Number of accumulated records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether no records were accumulated
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Observer
// ============================================================================

/// Progress observer injected into the collection engine.
///
/// All methods have no-op defaults; implementations override what they
/// care about. The engine holds no ambient logging state of its own.
pub trait CollectObserver: Send + Sync {
    /// A page was fetched and parsed
    fn page_fetched(&self, page_number: usize, records: usize, total_items: u64) {
        let _ = (page_number, records, total_items);
    }

    /// The server answered 429; the engine will pause and retry
    fn rate_limited(&self, failure_count: u32, delay: Duration) {
        let _ = (failure_count, delay);
    }

    /// A transport or parse failure occurred; the engine will pause and
    /// retry
    fn transient_error(&self, failure_count: u32, error: &Error, delay: Duration) {
        let _ = (failure_count, error, delay);
    }

    /// The server answered a non-transient status; collection stops
    fn upstream_error(&self, status: u16, body: &str) {
        let _ = (status, body);
    }

    /// The retry budget ran out; collection stops
    fn budget_exhausted(&self, max_retries: u32) {
        let _ = max_retries;
    }
}

/// Default observer forwarding engine progress to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CollectObserver for TracingObserver {
    fn page_fetched(&self, page_number: usize, records: usize, total_items: u64) {
        debug!("Page {page_number}: fetched {records} records of {total_items} total");
    }

    fn rate_limited(&self, failure_count: u32, delay: Duration) {
        warn!(
            "Received 'Too Many Requests' (failure {failure_count}). Will pause for {}s",
            delay.as_secs()
        );
    }

    fn transient_error(&self, failure_count: u32, err: &Error, delay: Duration) {
        warn!(
            "{err} (failure {failure_count}), waiting for {}s",
            delay.as_secs()
        );
    }

    fn upstream_error(&self, status: u16, body: &str) {
        error!("Received a response of {status} -> '{body}'");
    }

    fn budget_exhausted(&self, max_retries: u32) {
        error!("Failed to retrieve response after maximum ({max_retries}) retry amount");
    }
}
