use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Layer as _};

/// Used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str =
    "info,web_conferences_backend=debug,web_conferences_database=debug,tower_http=debug";

pub fn setup_tracing() {
    let stdout_log = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into()),
        ))
        .init();
}
