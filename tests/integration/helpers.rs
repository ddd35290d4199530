//! Test helpers and utilities

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use reqwest::{Client, Response};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use reqlog::config::{ResourceConfig, ServerConfig};
use reqlog::core::{Context, Error, Request, Response as AppResponse, Result};
use reqlog::entry::{HttpRequest, LogEntry};
use reqlog::middleware::{Handler, LoggerMiddleware};
use reqlog::sink::MemorySink;
use reqlog::{Server, Severity};

pub const PROJECT_ID: &str = "proj1";
pub const ACCESS_LOG: &str = "svc_request";
pub const APP_LOG: &str = "svc_application";

pub type TestHook = LoggerMiddleware<TestApp>;

/// Routes used by the tests.
///
/// - `/` logs INFO
/// - `/warn` logs WARNING then INFO
/// - `/quiet` logs nothing
/// - `/debug` logs DEBUG (below the default threshold)
/// - `/error` fails with a server error
/// - `/missing` fails with 404
/// - `/slow?ms=N` logs WARNING and sleeps N ms
/// - `/echo` returns the request body
/// - `/fanout` logs from three spawned sub-tasks
pub struct TestApp;

#[async_trait]
impl Handler for TestApp {
    async fn call(&self, req: Request, ctx: &mut Context) -> Result<AppResponse> {
        let logger = ctx.logger();
        match req.path() {
            "/" => {
                logger.info("hello");
                Ok(AppResponse::ok("Hello"))
            }
            "/warn" => {
                logger.warning("careful");
                logger.info("carrying on");
                Ok(AppResponse::ok("warned"))
            }
            "/quiet" => Ok(AppResponse::ok("quiet")),
            "/debug" => {
                logger.debug("details");
                Ok(AppResponse::ok("debug"))
            }
            "/error" => Err(Error::from("backend unavailable")),
            "/missing" => Err(Error::status(StatusCode::NOT_FOUND, "missing")),
            "/slow" => {
                let ms = req
                    .query()
                    .and_then(|q| q.strip_prefix("ms="))
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100);
                logger.warning("slow path");
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(AppResponse::ok("slow"))
            }
            "/echo" => Ok(AppResponse::ok(req.body().clone())),
            "/fanout" => {
                let mut tasks = tokio::task::JoinSet::new();
                for severity in [Severity::Info, Severity::Critical, Severity::Notice] {
                    let logger = ctx.logger_handle();
                    tasks.spawn(async move { logger.log(severity, "sub-task") });
                }
                while let Some(joined) = tasks.join_next().await {
                    joined.map_err(|e| Error::Custom(e.to_string()))?;
                }
                Ok(AppResponse::ok("fanned out"))
            }
            _ => Err(Error::status(StatusCode::NOT_FOUND, "no route")),
        }
    }
}

/// In-process server with an inspectable log sink.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub sink: Arc<MemorySink>,
    server: Arc<Server<TestHook>>,
    task: JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
    /// Start with default middleware settings.
    pub async fn start() -> Self {
        Self::start_with(|hook| hook).await
    }

    /// Start with customized middleware.
    pub async fn start_with(configure: impl FnOnce(TestHook) -> TestHook) -> Self {
        let sink = Arc::new(MemorySink::new());
        let resource = ResourceConfig::new("svc", PROJECT_ID, "v1", "us-central1");
        let hook = configure(LoggerMiddleware::new(
            TestApp,
            sink.clone(),
            sink.clone(),
            &resource,
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr: SocketAddr = listener.local_addr().expect("No local address");

        let server = Arc::new(Server::new(ServerConfig::new(addr), hook));
        let task = {
            let server = Arc::clone(&server);
            tokio::spawn(async move {
                server.serve(listener).await.expect("Server failed");
            })
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{}", addr),
            client,
            sink,
            server,
            task,
        }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.get_with_headers(path, &[]).await
    }

    /// Make a GET request with custom headers
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Response {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.send().await.expect("GET request failed")
    }

    /// Access-log entries written so far.
    pub fn access_entries(&self) -> Vec<LogEntry> {
        self.sink.entries(ACCESS_LOG)
    }

    /// Application-log entries written so far.
    pub fn app_entries(&self) -> Vec<LogEntry> {
        self.sink.entries(APP_LOG)
    }

    /// Poll until at least one access entry is written or `within` passes.
    pub async fn wait_for_access(&self, within: Duration) -> Vec<LogEntry> {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            let entries = self.access_entries();
            if !entries.is_empty() || tokio::time::Instant::now() >= deadline {
                return entries;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// The single access entry, panicking if there is not exactly one.
    pub fn only_access(&self) -> (LogEntry, HttpRequest) {
        let entries = self.access_entries();
        assert_eq!(entries.len(), 1, "expected one access entry: {:?}", entries);
        let entry = entries.into_iter().next().unwrap();
        let http = entry.http_request.clone().expect("access entry without httpRequest");
        (entry, http)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.trigger_shutdown();
        self.task.abort();
    }
}

/// Composed trace name for a raw trace id.
pub fn trace_name(trace_id: &str) -> String {
    format!("projects/{}/traces/{}", PROJECT_ID, trace_id)
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status().as_u16(),
        expected.as_u16(),
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}
