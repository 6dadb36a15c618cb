//! Tracing setup for tests driving the harness.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber writing through the test capture.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Safe to call from
/// every test; only the first call installs a subscriber.
pub fn init() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .with_test_writer()
    .try_init();
}
