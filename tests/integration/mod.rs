//! Integration tests for reqlog
//!
//! Each test starts the server in-process on an ephemeral port, with a
//! `MemorySink` behind both log streams, and talks to it over HTTP.
//!
//! Run with: cargo test --test integration

mod helpers;

mod http_server;
mod request_log;
