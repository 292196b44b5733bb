//! Blocking getters: deadlines, uniform errors, shutdown.

use lattice_client::{CacheMode, ClientError, ErrorKind};
use lattice_core::TransportError;
use lattice_test_utils::assertions::assert_timeout;
use lattice_test_utils::fixtures::{self, page_uri};
use lattice_test_utils::{blocking_client, CountingFetchAdapter};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn page_fetcher(latency: Option<Duration>) -> Arc<CountingFetchAdapter> {
    let fetcher = match latency {
        Some(latency) => CountingFetchAdapter::new().with_latency(latency),
        None => CountingFetchAdapter::new(),
    };
    fetcher.insert_one(page_uri(1, 123), fixtures::page(1, 123, "Home"));
    fetcher.insert_one(
        format!("{}/StructureGroup", page_uri(1, 123)),
        fixtures::structure_group(1, 4, 0, None),
    );
    Arc::new(fetcher)
}

#[test]
fn test_blocking_resolve_returns_value() {
    let client = blocking_client(page_fetcher(None), CacheMode::Simple, 1);

    let page = client.page(1, 123).resolve_blocking(None).unwrap().unwrap();
    assert_eq!(page.publish.title.as_deref(), Some("Home"));

    let group = page.structure_group().resolve_blocking(None).unwrap().unwrap();
    assert_eq!(group.id, 4);
}

#[test]
fn test_blocking_not_found_is_none() {
    let client = blocking_client(page_fetcher(None), CacheMode::None, 1);
    assert!(client.page(2, 2).resolve_blocking(None).unwrap().is_none());
}

#[test]
fn test_blocking_timeout_returns_promptly() {
    let client = blocking_client(
        page_fetcher(Some(Duration::from_millis(500))),
        CacheMode::None,
        1,
    );

    let started = Instant::now();
    let result = client
        .page(1, 123)
        .resolve_blocking(Some(Duration::from_millis(50)));
    let elapsed = started.elapsed();

    assert_timeout(&result);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Timeout);
    assert!(elapsed < Duration::from_millis(400), "waited {elapsed:?}");
}

#[test]
fn test_timed_out_resolution_still_populates_cache() {
    let fetcher = page_fetcher(Some(Duration::from_millis(150)));
    let client = blocking_client(fetcher.clone(), CacheMode::Simple, 1);
    let reference = client.page(1, 123);

    let result = reference.resolve_blocking(Some(Duration::from_millis(10)));
    assert_timeout(&result);

    std::thread::sleep(Duration::from_millis(500));
    let page = reference.resolve_blocking(None).unwrap();
    assert!(page.is_some());
    assert_eq!(fetcher.calls(page_uri(1, 123)), 1);
}

#[test]
fn test_blocking_wraps_transport_failure() {
    let fetcher = page_fetcher(None);
    fetcher.insert_failure(
        page_uri(1, 123),
        TransportError::Request {
            uri: page_uri(1, 123),
            reason: "connection refused".to_string(),
        },
    );
    let client = blocking_client(fetcher, CacheMode::Simple, 1);

    let err = client.page(1, 123).resolve_blocking(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(err.cause(), ClientError::Transport(TransportError::Request { .. })));
}

#[test]
fn test_blocking_wraps_transform_failure_with_index() {
    let fetcher = page_fetcher(None);
    fetcher.insert_many(
        format!("{}/Keywords", page_uri(1, 123)),
        vec![
            fixtures::keyword(1, 1, 3, "ok", 0),
            fixtures::keyword(1, 2, 3, "bad", -2),
        ],
    );
    let client = blocking_client(fetcher, CacheMode::None, 1);
    let page = client.page(1, 123).resolve_blocking(None).unwrap().unwrap();

    let err = page
        .taxonomy()
        .keywords()
        .resolve_blocking(None)
        .unwrap_err();
    match err.into_cause() {
        ClientError::Transform(t) => assert_eq!(t.index, Some(1)),
        other => panic!("expected Transform, got {other:?}"),
    }
}

#[test]
fn test_blocking_after_shutdown_fails() {
    let client = blocking_client(page_fetcher(None), CacheMode::Simple, 1);
    let reference = client.page(1, 123);

    assert!(client.shutdown(Duration::from_secs(1)));
    let err = reference.resolve_blocking(None).unwrap_err();
    assert!(matches!(err.cause(), ClientError::ShutDown));
}

#[tokio::test]
async fn test_blocking_inside_async_context_is_rejected() {
    let fetcher = page_fetcher(None);
    let client = lattice_test_utils::async_client(fetcher.clone(), CacheMode::None, 1);

    let err = client.page(1, 123).resolve_blocking(None).unwrap_err();
    assert!(matches!(err.cause(), ClientError::BlockingInAsyncContext));
    assert_eq!(fetcher.total_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_from_spawn_blocking_thread_resolves() {
    let fetcher = page_fetcher(None);
    let client = lattice_test_utils::async_client(fetcher.clone(), CacheMode::Simple, 1);

    let page = tokio::task::spawn_blocking(move || client.page(1, 123).resolve_blocking(None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.map(|p| p.publish.item_id), Some(123));
    assert_eq!(fetcher.calls(page_uri(1, 123)), 1);
}
