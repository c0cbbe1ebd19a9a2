//! End-to-end tests of the workflow runners against a mock backend.

mod helpers;

use httptest::{cycle, matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use blacklist_monitor::{
    init_resources, run_check_all, run_import, CacheKey, CheckAllMode, ClientResources, Config,
    JobStatus, PollOutcome,
};
use helpers::{address_lines, base_url, TEST_KEY};

fn resources(server: &Server) -> ClientResources {
    let config = Config {
        api_url: base_url(server),
        import_batch_size: 2,
        import_batch_delay_ms: 0,
        poll_interval_ms: 10,
        ..Default::default()
    };
    init_resources(config, Some(TEST_KEY), CancellationToken::new())
        .expect("resources should initialize")
}

#[tokio::test]
async fn test_run_import_reports_final_counts() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/v1/ips/bulk"))
            .times(3)
            .respond_with(cycle![
                json_encoded(json!({"data": {"added": 2, "skipped": 0}})),
                json_encoded(json!({"data": {"added": 1, "skipped": 1}})),
                json_encoded(json!({"data": {"added": 1, "skipped": 0}})),
            ]),
    );

    let resources = resources(&server);
    let report = run_import(&resources, &address_lines(5), &["prod".to_string()])
        .await
        .expect("import should succeed");

    assert_eq!(report.run.total, 5);
    assert_eq!(report.run.added, 4);
    assert_eq!(report.run.skipped, 1);
    assert_eq!(report.run.errors, 0);
    assert_eq!(resources.cache.invalidation_count(&CacheKey::Activity), 1);
}

#[tokio::test]
async fn test_run_import_without_addresses_fails() {
    let server = Server::run();
    let resources = resources(&server);

    let err = run_import(&resources, "hello\nworld", &[])
        .await
        .expect_err("nothing to import");
    assert_eq!(err.to_string(), "No valid IP addresses found");
}

#[tokio::test]
async fn test_run_check_all_follows_job() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/v1/ips/check-all"))
            .times(1)
            .respond_with(json_encoded(json!({"job_id": "job-9", "total": 3}))),
    );
    server.expect(
        Expectation::matching(request::method_path(
            "GET",
            "/api/v1/ips/check-all/job-9/status",
        ))
        .times(2)
        .respond_with(cycle![
            json_encoded(json!({"job_id": "job-9", "status": "running", "progress": 33.3, "checked": 1, "total": 3})),
            json_encoded(json!({"job_id": "job-9", "status": "completed", "progress": 100.0, "checked": 3, "total": 3, "clean": 3})),
        ]),
    );

    let resources = resources(&server);
    let report = run_check_all(&resources, CheckAllMode::Start { wait: true })
        .await
        .expect("check-all should succeed");

    assert_eq!(report.job_id.as_deref(), Some("job-9"));
    assert!(matches!(report.outcome, PollOutcome::Finished(_)));
    let job = report.job.expect("final snapshot");
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.clean, 3);
    assert_eq!(resources.cache.invalidation_count(&CacheKey::Ips), 1);
}

#[tokio::test]
async fn test_run_check_all_no_wait_returns_immediately() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/v1/ips/check-all"))
            .times(1)
            .respond_with(json_encoded(json!({"data": {"job_id": "job-3"}}))),
    );

    let resources = resources(&server);
    let report = run_check_all(&resources, CheckAllMode::Start { wait: false })
        .await
        .expect("start should succeed");

    assert_eq!(report.job_id.as_deref(), Some("job-3"));
    assert_eq!(report.outcome, PollOutcome::Idle);
    assert_eq!(resources.cache.invalidation_count(&CacheKey::Ips), 0);
}

#[tokio::test]
async fn test_run_check_all_resume_without_job_fails() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/api/v1/ips/check-all/current"))
            .times(1)
            .respond_with(json_encoded(json!({"data": null}))),
    );

    let resources = resources(&server);
    let err = run_check_all(&resources, CheckAllMode::Resume)
        .await
        .expect_err("nothing to resume");
    assert_eq!(err.to_string(), "No check-all job is running");
}

#[tokio::test]
async fn test_run_check_all_cancel() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/api/v1/ips/check-all/current"))
            .times(1)
            .respond_with(json_encoded(json!({"job_id": "job-5", "status": "running", "progress": 10}))),
    );
    server.expect(
        Expectation::matching(request::method_path(
            "POST",
            "/api/v1/ips/check-all/job-5/cancel",
        ))
        .times(1)
        .respond_with(status_code(200)),
    );
    server.expect(
        Expectation::matching(request::method_path(
            "GET",
            "/api/v1/ips/check-all/job-5/status",
        ))
        .times(1..)
        .respond_with(json_encoded(json!({"job_id": "job-5", "status": "running", "progress": 10}))),
    );

    let resources = resources(&server);
    let report = run_check_all(&resources, CheckAllMode::Cancel)
        .await
        .expect("cancel should succeed");

    assert_eq!(report.job_id.as_deref(), Some("job-5"));
    assert!(matches!(report.outcome, PollOutcome::Dismissed(Some(_))));
    assert_eq!(resources.cache.invalidation_count(&CacheKey::Stats), 1);
}
