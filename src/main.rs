use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tracing::{error, info, warn};

use reqlog::config::Config;
use reqlog::core::{Context, Error, Request, Response, Result};
use reqlog::middleware::{handler_fn, LoggerMiddleware};
use reqlog::sink::{LogSink, WriterSink};
use reqlog::{logging, Server};

/// How long in-flight requests get after Ctrl-C.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env().map_err(|e| {
        // Subscriber is not up yet
        eprintln!("Configuration error: {}", e);
        e
    })?;

    logging::init(&config.logging);

    info!(
        version = reqlog::PKG_VERSION,
        build = reqlog::BUILD_VERSION,
        "Starting reqlog server..."
    );
    config.log_summary();

    // Handlers only log and format responses; one thread is plenty
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (sink, writer) = WriterSink::stdout(config.server.log_buffer);
    let sink: Arc<dyn LogSink> = Arc::new(sink);

    let hook = LoggerMiddleware::new(handler_fn(demo), Arc::clone(&sink), sink, &config.resource)
        .with_level(config.logging.app_level)
        .with_timeout(config.server.request_timeout.as_duration());

    let server = Server::new(config.server, hook);

    // Handle shutdown gracefully
    let outcome = tokio::select! {
        result = server.run() => result.map_err(|e| {
            error!("Server error: {}", e);
            e
        }),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            Ok(())
        }
    };

    server.trigger_shutdown();
    if !server.wait_for_drain(DRAIN_TIMEOUT).await {
        warn!("Exiting with requests still in flight");
    }

    // Last sink handle lives in the server; the writer flushes once it is gone
    drop(server);
    if tokio::time::timeout(Duration::from_secs(2), writer).await.is_err() {
        warn!("Log writer did not finish flushing");
    }

    outcome
}

/// Demo routes exercising each severity path.
fn demo(req: &Request, ctx: &Context) -> Result<Response> {
    let logger = ctx.logger();

    match req.path() {
        "/" => {
            logger.info(format!("hello from {}", req.path()));
            Ok(Response::ok("Hello, World!"))
        }
        "/warn" => {
            logger.info("about to warn");
            logger.warning("something looks off");
            Ok(Response::ok("warned"))
        }
        "/debug" => {
            logger.debug("only visible in the access severity");
            Ok(Response::ok("debugged"))
        }
        "/error" => Err(Error::from("demo failure")),
        _ => Err(Error::status(StatusCode::NOT_FOUND, "no such route")),
    }
}
