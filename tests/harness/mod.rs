//! Test harness shared by the integration tests.
//!
//! - [`MockStream`]: in-memory stream with optionally chunked reads
//! - [`frames`]: client frame builders and a decoder for server output
//! - [`TestServer`] / [`TestClient`]: echo server on a loopback TCP port

#![allow(dead_code)]

mod client;
pub mod frames;
mod metrics;
mod server;
mod stream;

pub use client::TestClient;
pub use frames::{Received, client_frame, close_frame, decode_all};
pub use metrics::Metrics;
pub use server::TestServer;
pub use stream::MockStream;

/// Route engine logs to the test output. Set `RUST_LOG=wsecho=debug` to see
/// per-frame events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
