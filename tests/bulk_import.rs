//! Integration tests for the bulk import orchestrator.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use httptest::{all_of, cycle, matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use blacklist_monitor::{BulkImporter, CacheKey, ErrorKind, ImportOptions, ImportPhase};
use helpers::{address_lines, test_cache, test_client};

const NO_TAGS: &[&str] = &[];

fn importer(server: &Server, batch_size: usize) -> (BulkImporter, Arc<blacklist_monitor::QueryCache>) {
    let cache = test_cache();
    let importer = BulkImporter::new(
        test_client(server),
        cache.clone(),
        ImportOptions::new(batch_size, Duration::ZERO),
    );
    (importer, cache)
}

#[tokio::test]
async fn test_batches_are_sent_in_order_with_shared_tags() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/api/v1/ips/bulk"),
            request::body(json_decoded(eq(json!({
                "ips": [
                    {"ip_address": "192.168.1.1", "name": "mail"},
                    {"ip_address": "10.0.0.1"}
                ],
                "tags": ["prod"]
            })))),
        ])
        .times(1)
        .respond_with(json_encoded(json!({"data": {"added": 2, "skipped": 0}}))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/api/v1/ips/bulk"),
            request::body(json_decoded(eq(json!({
                "ips": [{"ip_address": "2001:db8::1", "description": "v6, primary"}],
                "tags": ["prod"]
            })))),
        ])
        .times(1)
        .respond_with(json_encoded(json!({"data": {"added": 0, "skipped": 1}}))),
    );

    let (importer, cache) = importer(&server, 2);
    let text = "192.168.1.1,mail\n10.0.0.1;2001:db8::1,,v6, primary\n192.168.1.1,dup";
    let run = importer
        .import_text(text, &[" Prod "], &CancellationToken::new())
        .await
        .expect("import should succeed");

    assert_eq!(run.phase, ImportPhase::Completed);
    assert_eq!(run.total, 3);
    assert_eq!(run.current_offset, 3);
    assert_eq!(run.added, 2);
    assert_eq!(run.skipped, 1);
    assert_eq!(run.errors, 0);
    assert!(!run.cancelled);
    assert_eq!(cache.invalidation_count(&CacheKey::Ips), 1);
}

#[tokio::test]
async fn test_failed_batch_counts_every_address_as_error() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/v1/ips/bulk"))
            .times(3)
            .respond_with(cycle![
                json_encoded(json!({"data": {"added": 95, "skipped": 5}})),
                status_code(500).body(r#"{"detail":"database unavailable"}"#),
                json_encoded(json!({"data": {"added": 50, "skipped": 0}})),
            ]),
    );

    let (importer, cache) = importer(&server, 100);
    let run = importer
        .import_text(&address_lines(250), NO_TAGS, &CancellationToken::new())
        .await
        .expect("batch failures are not fatal");

    assert_eq!(run.phase, ImportPhase::Completed);
    assert_eq!(run.total, 250);
    assert_eq!(run.current_offset, 250);
    assert_eq!(run.added, 145);
    assert_eq!(run.skipped, 5);
    assert_eq!(run.errors, 100);
    assert!(run.added + run.skipped + run.errors <= run.current_offset);

    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].offset, 100);
    assert_eq!(run.failures[0].size, 100);
    assert_eq!(importer.error_stats().get(ErrorKind::Server), 100);

    // One invalidation per list family, after the last batch.
    for key in CacheKey::LIST_FAMILIES.iter() {
        assert_eq!(cache.invalidation_count(key), 1, "{}", key);
    }
}

#[tokio::test]
async fn test_cancellation_stops_before_next_batch() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/v1/ips/bulk"))
            .times(1)
            .respond_with(json_encoded(json!({"data": {"added": 100, "skipped": 0}}))),
    );

    let cache = test_cache();
    let importer = BulkImporter::new(
        test_client(&server),
        cache.clone(),
        ImportOptions::new(100, Duration::from_secs(5)),
    );

    let cancel = CancellationToken::new();
    let mut rx = importer.subscribe();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if rx.borrow_and_update().current_offset >= 100 {
                canceller.cancel();
                break;
            }
        }
    });

    let run = importer
        .import_text(&address_lines(300), NO_TAGS, &cancel)
        .await
        .expect("cancelled import still reports");

    assert!(run.cancelled);
    assert_eq!(run.phase, ImportPhase::Cancelled);
    assert_eq!(run.current_offset, 100);
    assert_eq!(run.added, 100);
    assert_eq!(importer.snapshot(), run);
    assert_eq!(cache.invalidation_count(&CacheKey::Stats), 1);
}

#[tokio::test]
async fn test_no_valid_addresses_sends_nothing() {
    // Any request to this server fails the test when it is dropped.
    let server = Server::run();
    let (importer, cache) = importer(&server, 100);

    let err = importer
        .import_text("not-an-ip\n999.1.1.1; ,name", NO_TAGS, &CancellationToken::new())
        .await
        .expect_err("nothing to import");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "No valid IP addresses found");
    assert_eq!(importer.snapshot().phase, ImportPhase::Idle);
    assert_eq!(cache.invalidation_count(&CacheKey::Ips), 0);
}

#[tokio::test]
async fn test_too_many_tags_sends_nothing() {
    let server = Server::run();
    let (importer, _cache) = importer(&server, 100);
    let tags: Vec<String> = (0..21).map(|i| format!("tag{}", i)).collect();

    let err = importer
        .import_text("10.0.0.1", &tags, &CancellationToken::new())
        .await
        .expect_err("21 tags are rejected");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_progress_is_published() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/v1/ips/bulk"))
            .times(2)
            .respond_with(json_encoded(json!({"added": 1, "skipped": 0}))),
    );

    let (importer, _cache) = importer(&server, 1);
    let rx = importer.subscribe();
    assert_eq!(rx.borrow().phase, ImportPhase::Idle);

    let run = importer
        .import_text("10.0.0.1\n10.0.0.2", NO_TAGS, &CancellationToken::new())
        .await
        .expect("import should succeed");

    let last = rx.borrow().clone();
    assert_eq!(last, run);
    assert_eq!(last.phase, ImportPhase::Completed);
    assert_eq!(last.added, 2);
    assert!((last.percent() - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_over_reported_counts_are_clamped_to_batch() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/v1/ips/bulk"))
            .times(1)
            .respond_with(json_encoded(json!({"data": {"added": 5, "skipped": 3}}))),
    );

    let (importer, _cache) = importer(&server, 100);
    let run = importer
        .import_text("10.0.0.1\n10.0.0.2", NO_TAGS, &CancellationToken::new())
        .await
        .expect("import should succeed");

    assert_eq!(run.added, 2);
    assert_eq!(run.skipped, 0);
    assert_eq!(run.current_offset, 2);
    assert!(run.added + run.skipped + run.errors <= run.current_offset);
    assert!(run.current_offset <= run.total);
}
