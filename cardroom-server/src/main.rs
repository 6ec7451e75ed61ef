//! Cardroom server: Axum HTTP/WebSocket transport over the room/game engine.

mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use cardroom_core::room::actor::ActorConfig;
use cardroom_core::room::registry::Registry;
use cardroom_server::config::ServerConfig;
use ctrlc::set_handler;
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run a cardroom game server

USAGE:
  cardroom-server [OPTIONS]

OPTIONS:
  --bind           IP:PORT     HTTP/WebSocket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --metrics-bind   IP:PORT     Prometheus metrics bind address  [default: env METRICS_BIND or 127.0.0.1:9090]

FLAGS:
  -h, --help                   Print help information

ENVIRONMENT:
  SERVER_BIND                      HTTP/WebSocket bind address
  METRICS_BIND                     Prometheus metrics bind address
  ROOM_EMPTY_TTL_SECONDS            seconds an emptied room lingers before closing [default: 300]
  RECONNECT_TIMEOUT_SECONDS         seconds a disconnected player has to reconnect [default: 120]
  JOIN_REQUEST_COOLDOWN_SECONDS     cooldown between join requests from the same user [default: 300]
  JOIN_REQUEST_MAX_ATTEMPTS         join requests allowed per room before rate-limited [default: 3]
  TURN_TIMER_GRACE_SECONDS          grace period added to a game's turn timer [default: 2]
  NODE_ENV                         \"development\" relaxes a few checks for local testing
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let metrics_bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--metrics-bind")?;

    cardroom_server::logging::init();

    let config = ServerConfig::from_env(bind_override, metrics_bind_override)
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    info!(bind = %config.bind, metrics_bind = %config.metrics_bind, "starting cardroom server");

    cardroom_server::metrics::init_metrics(config.metrics_bind)
        .map_err(|e| anyhow::anyhow!("failed to start metrics exporter: {e}"))?;

    set_handler(|| std::process::exit(0))?;

    let ws_hub = api::WsHub::new();
    let actor_config = ActorConfig {
        room_empty_ttl: config.room_empty_ttl,
        reconnect_timeout: config.reconnect_timeout,
        dev_mode: config.dev_mode,
    };
    let registry = Registry::new(Arc::new(ws_hub.clone()), actor_config);

    let state = api::AppState { registry, ws_hub };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind to {}: {}", config.bind, e))?;

    info!("server is running at http://{}. Press Ctrl+C to stop.", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    info!("shutting down server");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
