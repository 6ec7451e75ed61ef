//! HTTP/WebSocket API for the cardroom server.
//!
//! This module is the transport surface over [`cardroom_core`]: plain REST
//! handlers for room/game-catalog lookups and a WebSocket endpoint for
//! everything that needs to be live (room roster, game state, turn
//! notifications).
//!
//! # Modules
//!
//! - [`rooms`]: room lifecycle and game-catalog HTTP handlers
//! - [`websocket`]: the live per-connection protocol
//! - [`ws_hub`]: the in-process fan-out hub implementing `RoomEmitter`
//! - [`request_id`]: request-id middleware, attached to every response
//! - [`rate_limiter`]: sliding-window limiter used on the WebSocket's
//!   per-connection message rate
//!
//! # Endpoints
//!
//! ```text
//! POST /rooms                          - create a room
//! POST /rooms/join                     - join a room by code
//! POST /rooms/request-join             - request to join a private room
//! GET  /rooms/code/{code}              - look up a room by code
//! GET  /games                          - list playable game types
//! GET  /games/{game_type}/settings     - a game type's settings schema
//! GET  /healthz                        - liveness/readiness probe
//! GET  /ws?room_id=..&user_id=..       - WebSocket upgrade
//! ```

pub mod rate_limiter;
pub mod request_id;
pub mod rooms;
pub mod websocket;
pub mod ws_hub;

use axum::routing::{get, post};
use axum::Router;
use cardroom_core::room::registry::Registry;
use tower_http::cors::CorsLayer;

pub use ws_hub::WsHub;

/// Application state shared across all HTTP handlers and WebSocket
/// connections. Cheap to clone: both fields are internally `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub ws_hub: WsHub,
}

/// Build the complete router: every route in the module doc, plus the
/// request-id middleware and a permissive CORS layer.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/join", post(rooms::join_room))
        .route("/rooms/request-join", post(rooms::request_join))
        .route("/rooms/code/{code}", get(rooms::get_room_by_code))
        .route("/games", get(rooms::list_games))
        .route("/games/{game_type}/settings", get(rooms::game_settings_schema))
        .route("/healthz", get(rooms::healthz))
        .route("/ws", get(websocket::websocket_handler))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardroom_core::events::NullEmitter;
    use cardroom_core::room::actor::ActorConfig;
    use std::sync::Arc;

    fn state() -> AppState {
        let ws_hub = WsHub::new();
        let registry = Registry::new(Arc::new(NullEmitter), ActorConfig::default());
        AppState { registry, ws_hub }
    }

    #[test]
    fn router_builds_without_panicking() {
        let _router = create_router(state());
    }
}
