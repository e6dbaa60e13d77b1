//! Tests for the collection engine
//!
//! Every scenario runs against a mocked server; the fixed backoff is
//! shrunk to milliseconds through the retry policy.

use super::*;
use crate::http::{HttpSession, HttpSessionConfig};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_session() -> HttpSession {
    HttpSession::with_config(HttpSessionConfig::builder().no_rate_limit().build())
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(5))
}

fn page_body(ids: &[&str], next: Option<&str>, total: u64) -> serde_json::Value {
    json!({
        "data": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
        "links": {"next": next},
        "meta": {"total_items": total}
    })
}

fn ids(collection: &Collection) -> Vec<String> {
    collection
        .records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_orders_records_across_pages() {
    let server = MockServer::start().await;

    let p2 = format!("{}/p2", server.uri());
    let p3 = format!("{}/p3", server.uri());

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&["a", "b"], Some(&p2), 5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&["c", "d"], Some(&p3), 5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["e"], None, 5)))
        .mount(&server)
        .await;

    let collector = PageCollector::new(test_session()).with_policy(fast_policy(3));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert!(collection.is_complete());
    assert_eq!(ids(&collection), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(collection.pages, 3);
}

#[tokio::test]
async fn test_stops_exactly_at_reported_total() {
    let server = MockServer::start().await;

    let p2 = format!("{}/p2", server.uri());
    let p3 = format!("{}/p3", server.uri());

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&["a", "b"], Some(&p2), 4)),
        )
        .expect(1)
        .mount(&server)
        .await;

    // The cumulative count reaches the total here even though the server
    // still offers a cursor; that cursor must never be followed.
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&["c", "d"], Some(&p3), 4)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[], None, 4)))
        .expect(0)
        .mount(&server)
        .await;

    let collector = PageCollector::new(test_session()).with_policy(fast_policy(3));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert!(collection.is_complete());
    assert_eq!(ids(&collection), vec!["a", "b", "c", "d"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_429_exhausts_budget_after_max_plus_one_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let max_retries = 3;
    let collector = PageCollector::new(test_session()).with_policy(fast_policy(max_retries));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert!(collection.is_empty());
    assert_eq!(
        collection.status,
        CollectionStatus::Partial {
            reason: AbortReason::RetryBudgetExhausted { max_retries }
        }
    );
    // Initial attempt plus max_retries retries.
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        (max_retries + 1) as usize
    );
}

#[tokio::test]
async fn test_mixed_failures_share_one_counter() {
    let server = MockServer::start().await;

    // 429, malformed body, 429, then 429s forever: four distinct
    // recoverable failures. With a budget of three the fourth must end
    // the call -- the counter is shared, not per failure class.
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ this is not json"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let collector = PageCollector::new(test_session()).with_policy(fast_policy(3));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert!(collection.is_empty());
    assert_eq!(
        collection.status,
        CollectionStatus::Partial {
            reason: AbortReason::RetryBudgetExhausted { max_retries: 3 }
        }
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_non_transient_status_short_circuits() {
    let server = MockServer::start().await;

    let p2 = format!("{}/p2", server.uri());

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&["a", "b"], Some(&p2), 4)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let collector = PageCollector::new(test_session()).with_policy(fast_policy(10));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    // Records fetched before the failure survive; no retries happen.
    assert_eq!(ids(&collection), vec!["a", "b"]);
    assert_eq!(
        collection.status,
        CollectionStatus::Partial {
            reason: AbortReason::UpstreamError { status: 500 }
        }
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_two_page_walk_in_exactly_two_calls() {
    let server = MockServer::start().await;

    let url2 = format!("{}/url2", server.uri());

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&["A", "B"], Some(&url2), 4)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/url2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["C", "D"], None, 4)))
        .mount(&server)
        .await;

    let collector = PageCollector::new(test_session()).with_policy(fast_policy(3));
    let collection = collector.collect(&format!("{}/start", server.uri())).await;

    assert!(collection.is_complete());
    assert_eq!(ids(&collection), vec!["A", "B", "C", "D"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failure_counter_resets_on_success() {
    let server = MockServer::start().await;

    let p2 = format!("{}/p2", server.uri());

    // Two failures before each page with a budget of two: only a counter
    // that resets on success survives to completion.
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&["a", "b"], Some(&p2), 4)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["c", "d"], None, 4)))
        .mount(&server)
        .await;

    let collector = PageCollector::new(test_session()).with_policy(fast_policy(2));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert!(collection.is_complete());
    assert_eq!(ids(&collection), vec!["a", "b", "c", "d"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_first_fetch_failure_never_reads_as_complete() {
    let server = MockServer::start().await;

    // Malformed bodies from the very first page: the total stays unknown
    // the whole time, so the engine must keep attempting until the budget
    // is gone rather than conclude completion from the sentinel.
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let max_retries = 2;
    let collector = PageCollector::new(test_session()).with_policy(fast_policy(max_retries));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert!(!collection.is_complete());
    assert!(collection.is_empty());
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        (max_retries + 1) as usize
    );
}

#[tokio::test]
async fn test_missing_cursor_before_total_is_partial() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], None, 3)))
        .mount(&server)
        .await;

    let collector = PageCollector::new(test_session()).with_policy(fast_policy(3));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert_eq!(ids(&collection), vec!["a"]);
    assert_eq!(
        collection.status,
        CollectionStatus::Partial {
            reason: AbortReason::MissingCursor
        }
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_category_completes_on_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[], None, 0)))
        .mount(&server)
        .await;

    let collector = PageCollector::new(test_session()).with_policy(fast_policy(3));
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert!(collection.is_complete());
    assert!(collection.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[derive(Default)]
struct RecordingObserver {
    pages: AtomicU32,
    rate_limits: AtomicU32,
    transients: AtomicU32,
    exhaustions: AtomicU32,
}

impl CollectObserver for RecordingObserver {
    fn page_fetched(&self, _page_number: usize, _records: usize, _total_items: u64) {
        self.pages.fetch_add(1, Ordering::SeqCst);
    }

    fn rate_limited(&self, _failure_count: u32, _delay: Duration) {
        self.rate_limits.fetch_add(1, Ordering::SeqCst);
    }

    fn transient_error(&self, _failure_count: u32, _error: &crate::error::Error, _delay: Duration) {
        self.transients.fetch_add(1, Ordering::SeqCst);
    }

    fn budget_exhausted(&self, _max_retries: u32) {
        self.exhaustions.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_observer_sees_engine_progress() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["a"], None, 1)))
        .mount(&server)
        .await;

    let observer = std::sync::Arc::new(RecordingObserver::default());
    let collector = PageCollector::new(test_session())
        .with_policy(fast_policy(3))
        .with_observer(observer.clone());
    let collection = collector.collect(&format!("{}/p1", server.uri())).await;

    assert!(collection.is_complete());
    assert_eq!(observer.pages.load(Ordering::SeqCst), 1);
    assert_eq!(observer.rate_limits.load(Ordering::SeqCst), 1);
    assert_eq!(observer.transients.load(Ordering::SeqCst), 0);
    assert_eq!(observer.exhaustions.load(Ordering::SeqCst), 0);
}
