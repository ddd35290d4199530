//! Per-request logger isolation under concurrency.

use http::StatusCode;
use reqlog::Severity;
use tokio::task::JoinSet;

use crate::helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_do_not_share_severity() {
    let server = std::sync::Arc::new(TestServer::start().await);

    let mut requests = JoinSet::new();
    for i in 0..20u32 {
        let server = std::sync::Arc::clone(&server);
        requests.spawn(async move {
            let path = if i % 2 == 0 { "/warn" } else { "/quiet" };
            let trace_id = format!("{:032x}", i + 1);
            let header = format!("{}/{}", trace_id, i + 1);
            let resp = server
                .get_with_headers(path, &[("x-cloud-trace-context", header.as_str())])
                .await;
            assert_status(&resp, StatusCode::OK);
        });
    }
    while let Some(joined) = requests.join_next().await {
        joined.expect("request task panicked");
    }

    assert_eq!(server.access_entries().len(), 20);

    for i in 0..20u32 {
        let trace = trace_name(&format!("{:032x}", i + 1));
        let records = server.sink.entries_for_trace(&trace);
        let access: Vec<_> = records.iter().filter(|r| r.log_name == ACCESS_LOG).collect();

        assert_eq!(access.len(), 1, "trace {} has {} access entries", trace, access.len());
        let expected = if i % 2 == 0 {
            Severity::Warning
        } else {
            Severity::Default
        };
        assert_eq!(access[0].entry.severity, expected, "trace {}", trace);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sub_tasks_roll_up() {
    let server = TestServer::start().await;
    let resp = server.get("/fanout").await;
    assert_status(&resp, StatusCode::OK);

    let (entry, _) = server.only_access();
    assert_eq!(entry.severity, Severity::Critical);

    let app = server.app_entries();
    assert_eq!(app.len(), 3);
    assert!(app.iter().all(|e| e.trace == entry.trace));
}

#[tokio::test]
async fn test_sequential_requests_start_fresh() {
    let server = TestServer::start().await;
    server.get("/error").await;
    server.get("/quiet").await;

    let access = server.access_entries();
    assert_eq!(access.len(), 2);
    assert_eq!(access[0].severity, Severity::Error);
    assert_eq!(access[1].severity, Severity::Default);
}

#[tokio::test]
async fn test_sink_failure_does_not_affect_response() {
    let server = TestServer::start().await;
    server.sink.set_failing(true);

    let resp = server.get("/error").await;
    assert_status(&resp, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(server.sink.is_empty());

    server.sink.set_failing(false);
    let resp = server.get("/").await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(server.access_entries().len(), 1);
}
