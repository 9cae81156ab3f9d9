//! Tracing initialisation helpers for tests.
//!
//! Call [`init_test_tracing`] at the top of any test that emits tracing events
//! and wants them captured by the test harness.

use tracing_subscriber::EnvFilter;

/// Initialise a tracing subscriber that writes to the test-harness writer
/// and respects the `RUST_LOG` environment variable.
///
/// Safe to call multiple times; only the first call installs a subscriber.
///
/// # Example
///
/// ```ignore
/// #[tokio::test]
/// async fn my_test() {
///     yasync_test_utils::tracing_setup::init_test_tracing();
///     tracing::debug!("visible when RUST_LOG=debug");
/// }
/// ```
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
