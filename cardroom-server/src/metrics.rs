//! Prometheus metrics for monitoring cardroom server health and performance.
//!
//! Metrics are exposed in Prometheus text format via [`init_metrics`]'s
//! scrape listener, separate from the main HTTP/WebSocket port.
//!
//! # Metrics
//!
//! - `cardroom_rooms_active` — gauge, rooms currently held by the registry
//! - `cardroom_connections_active` — gauge, live WebSocket sockets
//! - `cardroom_games_active` — gauge, rooms with a game in progress
//! - `cardroom_room_dispatch_seconds` — histogram, time to process one
//!   `RoomMessage` inside a room actor
//! - `cardroom_http_requests_total` — counter, HTTP requests by method/path/status
//!
//! # Example
//!
//! ```rust,no_run
//! use cardroom_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//! metrics::rooms_active(3);
//! ```

#![allow(dead_code)] // not every metric is wired into every call site yet

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the Prometheus metrics exporter.
///
/// Metrics become available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install Prometheus exporter: {e}"))
}

/// Record a completed HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("cardroom_http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("cardroom_http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Set the number of rooms currently held by the registry.
pub fn rooms_active(count: usize) {
    metrics::gauge!("cardroom_rooms_active").set(count as f64);
}

/// Set the number of live WebSocket connections.
pub fn connections_active(count: usize) {
    metrics::gauge!("cardroom_connections_active").set(count as f64);
}

/// Set the number of rooms with a game currently in progress.
pub fn games_active(count: usize) {
    metrics::gauge!("cardroom_games_active").set(count as f64);
}

/// Record how long a room actor took to process one inbox message.
pub fn room_dispatch_duration(elapsed: Duration) {
    metrics::histogram!("cardroom_room_dispatch_seconds").record(elapsed.as_secs_f64());
}

/// Increment the rate-limit-hit counter for an endpoint.
pub fn rate_limit_hits_total(endpoint: &str) {
    metrics::counter!("cardroom_rate_limit_hits_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}
