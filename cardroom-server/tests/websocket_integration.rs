//! WebSocket upgrade surface, exercised with `tower::ServiceExt::oneshot`.
//!
//! Testing an actual upgraded WebSocket round-trip requires a running
//! server and a real client (can't be done with `oneshot()`), so these
//! tests cover the request-level checks the handler performs before a
//! socket is ever handed off: missing room, and the header validation
//! Axum enforces for any `GET` that asks for an upgrade.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cardroom_core::events::NullEmitter;
use cardroom_core::ids::UserId;
use cardroom_core::room::actor::ActorConfig;
use cardroom_core::room::registry::Registry;
use cardroom_server::api::{create_router, AppState, WsHub};
use tower::ServiceExt;

fn app() -> axum::Router {
    let ws_hub = WsHub::new();
    let registry = Registry::new(Arc::new(NullEmitter), ActorConfig::default());
    create_router(AppState { registry, ws_hub })
}

fn upgrade_request(uri: String) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn ws_without_query_params_is_rejected_before_upgrade() {
    let response = app().oneshot(upgrade_request("/ws".into())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ws_for_an_unknown_room_is_not_found() {
    let room_id = uuid::Uuid::new_v4();
    let user_id = uuid::Uuid::new_v4();
    let response = app()
        .oneshot(upgrade_request(format!("/ws?room_id={room_id}&user_id={user_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ws_without_upgrade_headers_is_rejected_by_the_extractor() {
    let registry = Registry::new(Arc::new(NullEmitter), ActorConfig::default());
    let handle = registry.create_room(UserId::new(), "alice".into(), "game night".into()).await.unwrap();
    let app = create_router(AppState { registry, ws_hub: WsHub::new() });

    // Same room/user as a real connection would use, but without the
    // WebSocket handshake headers: Axum's `WebSocketUpgrade` extractor
    // rejects the request before the handler body runs.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/ws?room_id={}&user_id={}", handle.room_id().0, UserId::new().0))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
}

#[tokio::test]
async fn ws_with_valid_headers_and_room_switches_protocols() {
    let registry = Registry::new(Arc::new(NullEmitter), ActorConfig::default());
    let creator = UserId::new();
    let handle = registry.create_room(creator, "alice".into(), "game night".into()).await.unwrap();
    let app = create_router(AppState { registry, ws_hub: WsHub::new() });

    let response = app
        .oneshot(upgrade_request(format!("/ws?room_id={}&user_id={}", handle.room_id().0, creator.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
}
