//! Structured logging configuration.
//!
//! Thin wrapper around `tracing_subscriber` so `main` has one call to make
//! and the `RUST_LOG` env var still works as usual.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging.
///
/// Respects `RUST_LOG` when set; otherwise defaults to `info` with the
/// HTTP tracing layer's own spans quieted to `warn`.
///
/// # Example
///
/// ```no_run
/// use cardroom_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("structured logging initialized");
}

/// Log a completed HTTP request (method, path, status, latency).
///
/// # Example
///
/// ```
/// use cardroom_server::logging::log_api_request;
///
/// log_api_request("GET", "/rooms/code/AB12CD", 200, 4);
/// ```
pub fn log_api_request(method: &str, path: &str, status: u16, duration_ms: u64) {
    tracing::info!(
        http_method = method,
        http_path = path,
        http_status = status,
        duration_ms = duration_ms,
        "request completed"
    );
}
