//! Runs the api on a real socket and talks to it with a plain hyper client.

pub mod http_e2e;

use tracing_subscriber::EnvFilter;

/// Logs into the test output, filtered by `RUST_LOG`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
