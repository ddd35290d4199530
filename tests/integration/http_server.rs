//! End-to-end HTTP tests: responses and the access entry each request leaves.

use std::time::Duration;

use http::StatusCode;
use reqlog::config::ServerConfig;
use reqlog::{Server, Severity};

use crate::helpers::*;

#[tokio::test]
async fn test_get_logs_info() {
    let server = TestServer::start().await;
    let resp = server.get("/").await;

    assert_status(&resp, StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "Hello");

    let (entry, http) = server.only_access();
    assert_eq!(entry.severity, Severity::Info);
    assert_eq!(http.status, 200);
    assert_eq!(http.request_method, "GET");
    assert_eq!(http.request_url, "/");
    assert_eq!(http.remote_ip, "127.0.0.1");
    assert_eq!(http.response_size, 5);
    assert_eq!(http.protocol.as_deref(), Some("HTTP/1.1"));
    assert!(entry.trace_sampled);

    let app = server.app_entries();
    assert_eq!(app.len(), 1);
    assert_eq!(app[0].trace, entry.trace);
}

#[tokio::test]
async fn test_warning_then_info() {
    let server = TestServer::start().await;
    server.get("/warn").await;

    let (entry, _) = server.only_access();
    assert_eq!(entry.severity, Severity::Warning);
    assert_eq!(server.app_entries().len(), 2);
}

#[tokio::test]
async fn test_nothing_logged() {
    let server = TestServer::start().await;
    let resp = server.get("/quiet").await;
    assert_status(&resp, StatusCode::OK);

    let (entry, http) = server.only_access();
    assert_eq!(entry.severity, Severity::Default);
    assert_eq!(http.status, 200);
    assert!(server.app_entries().is_empty());
}

#[tokio::test]
async fn test_debug_below_threshold() {
    let server = TestServer::start().await;
    server.get("/debug").await;

    let (entry, _) = server.only_access();
    assert_eq!(entry.severity, Severity::Debug);
    assert!(server.app_entries().is_empty());
}

#[tokio::test]
async fn test_handler_error() {
    let server = TestServer::start().await;
    let resp = server.get("/error").await;

    assert_status(&resp, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), "Internal Server Error");

    let (entry, http) = server.only_access();
    assert_eq!(entry.severity, Severity::Error);
    assert_eq!(http.status, 500);

    let app = server.app_entries();
    assert_eq!(app.len(), 1);
    assert_eq!(app[0].message.as_deref(), Some("backend unavailable"));
}

#[tokio::test]
async fn test_not_found() {
    let server = TestServer::start().await;
    let resp = server.get("/nowhere").await;

    assert_status(&resp, StatusCode::NOT_FOUND);

    let (entry, http) = server.only_access();
    assert_eq!(entry.severity, Severity::Default);
    assert_eq!(http.status, 404);
    assert_eq!(http.request_url, "/nowhere");
}

#[tokio::test]
async fn test_forwarded_for_first_hop() {
    let server = TestServer::start().await;
    server
        .get_with_headers("/", &[("x-forwarded-for", "1.2.3.4, 5.6.7.8")])
        .await;

    let (_, http) = server.only_access();
    assert_eq!(http.remote_ip, "1.2.3.4");
}

#[tokio::test]
async fn test_cloud_trace_header() {
    let server = TestServer::start().await;
    server
        .get_with_headers(
            "/",
            &[(
                "x-cloud-trace-context",
                "105445aa7843bc8bf206b12000100000/255;o=1",
            )],
        )
        .await;

    let (entry, _) = server.only_access();
    assert_eq!(entry.trace, trace_name("105445aa7843bc8bf206b12000100000"));
    assert_eq!(entry.span_id, "00000000000000ff");

    let app = server.app_entries();
    assert_eq!(app[0].trace, entry.trace);
    assert_eq!(app[0].span_id, entry.span_id);
}

#[tokio::test]
async fn test_traceparent_fallback() {
    let server = TestServer::start().await;
    server
        .get_with_headers(
            "/",
            &[(
                "traceparent",
                "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01",
            )],
        )
        .await;

    let (entry, _) = server.only_access();
    assert_eq!(entry.trace, trace_name("0af7651916cd43dd8448eb211c80319c"));
    assert_eq!(entry.span_id, "b7ad6b7169203331");
}

#[tokio::test]
async fn test_without_trace_header() {
    let server = TestServer::start().await;
    server.get("/").await;

    let (entry, _) = server.only_access();
    assert_eq!(entry.trace, trace_name(&"0".repeat(32)));
    assert_eq!(entry.span_id, "0".repeat(16));
}

#[tokio::test]
async fn test_post_body_sizes() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .post(format!("{}/echo", server.base_url))
        .body("0123456789")
        .send()
        .await
        .expect("POST request failed");

    assert_status(&resp, StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "0123456789");

    let (_, http) = server.only_access();
    assert_eq!(http.request_method, "POST");
    assert_eq!(http.request_size, Some(10));
    assert_eq!(http.response_size, 10);
}

#[tokio::test]
async fn test_latency_recorded() {
    let server = TestServer::start().await;
    server.get("/slow?ms=50").await;

    let (entry, http) = server.only_access();
    assert_eq!(entry.severity, Severity::Warning);
    assert!(http.latency >= Duration::from_millis(50));
    assert!(http.latency < Duration::from_secs(5));
}

#[tokio::test]
async fn test_request_timeout() {
    let server = TestServer::start_with(|hook| {
        hook.with_timeout(Some(Duration::from_millis(50)))
    })
    .await;
    let resp = server.get("/slow?ms=5000").await;

    assert_status(&resp, StatusCode::GATEWAY_TIMEOUT);

    let (entry, http) = server.only_access();
    assert_eq!(entry.severity, Severity::Error);
    assert_eq!(http.status, 504);
}

#[tokio::test]
async fn test_client_disconnect_logged_as_closed() {
    let server = TestServer::start().await;
    let impatient = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let result = impatient
        .get(format!("{}/slow?ms=5000", server.base_url))
        .send()
        .await;
    assert!(result.unwrap_err().is_timeout());

    // The handler would finish at 5s; the entry must come from the disconnect
    let entries = server.wait_for_access(Duration::from_secs(3)).await;
    assert_eq!(entries.len(), 1, "expected one access entry: {:?}", entries);
    assert_eq!(entries[0].severity, Severity::Warning);

    let http = entries[0].http_request.as_ref().unwrap();
    assert_eq!(http.status, 499);
    assert_eq!(http.response_size, 0);
    assert!(http.latency < Duration::from_secs(5));
}

#[tokio::test]
async fn test_with_level_warning() {
    let server = TestServer::start_with(|hook| hook.with_level(Severity::Warning)).await;
    server.get("/warn").await;

    let app = server.app_entries();
    assert_eq!(app.len(), 1);
    assert_eq!(app[0].severity, Severity::Warning);
}

#[tokio::test]
async fn test_record_json_shape() {
    let server = TestServer::start().await;
    server
        .get_with_headers("/warn", &[("x-forwarded-for", "9.9.9.9")])
        .await;

    let records = server.sink.records();
    let access = records
        .iter()
        .find(|r| r.log_name == ACCESS_LOG)
        .expect("no access record");
    let json = serde_json::to_value(access).unwrap();

    assert_eq!(json["logName"], ACCESS_LOG);
    assert_eq!(json["resource"]["type"], "gae_app");
    assert_eq!(json["resource"]["labels"]["module_id"], "svc");
    assert_eq!(json["resource"]["labels"]["project_id"], PROJECT_ID);
    assert_eq!(json["resource"]["labels"]["version_id"], "v1");
    assert_eq!(json["resource"]["labels"]["zone"], "us-central1");
    assert_eq!(json["severity"], "WARNING");
    assert_eq!(json["traceSampled"], true);
    assert_eq!(json["httpRequest"]["requestMethod"], "GET");
    assert_eq!(json["httpRequest"]["remoteIp"], "9.9.9.9");
    assert_eq!(json["httpRequest"]["status"], 200);
    assert!(json["httpRequest"]["latency"].as_str().unwrap().ends_with('s'));
    assert!(json.get("message").is_none());

    let app = records
        .iter()
        .find(|r| r.log_name == APP_LOG)
        .expect("no application record");
    let json = serde_json::to_value(app).unwrap();
    assert_eq!(json["message"], "careful");
    assert!(json.get("httpRequest").is_none());
}

#[tokio::test]
async fn test_run_fails_when_address_taken() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();

    let server = Server::new(ServerConfig::new(addr), TestApp);
    assert!(server.run().await.is_err());
}
