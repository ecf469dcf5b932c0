//! Logging setup for the station binary and tests.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. `directive` is the default
/// filter (e.g. from the configuration file); `RUST_LOG` wins when set.
pub fn setup_logging(directive: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Verbose logging for tests. Safe to call from every test; only the first
/// call installs the subscriber.
pub fn setup_logging_verbose() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
