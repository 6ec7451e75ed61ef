//! REST surface of the server, exercised with `tower::ServiceExt::oneshot`
//! against the router directly (no bound socket needed).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cardroom_core::events::NullEmitter;
use cardroom_core::room::actor::ActorConfig;
use cardroom_core::room::registry::Registry;
use cardroom_server::api::{create_router, AppState, WsHub};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> axum::Router {
    let ws_hub = WsHub::new();
    let registry = Registry::new(Arc::new(NullEmitter), ActorConfig::default());
    create_router(AppState { registry, ws_hub })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn healthz_reports_zero_rooms_on_a_fresh_server() {
    let response = app().oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rooms"], 0);
}

#[tokio::test]
async fn list_games_describes_spades_and_dominoes() {
    let response = app().oneshot(Request::builder().uri("/games").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let game_types: Vec<String> = body.as_array().unwrap().iter().map(|g| g["gameType"].as_str().unwrap().to_string()).collect();
    assert!(game_types.contains(&"spades".to_string()));
    assert!(game_types.contains(&"dominoes".to_string()));
}

#[tokio::test]
async fn game_settings_schema_rejects_an_unknown_game_type() {
    let response = app()
        .oneshot(Request::builder().uri("/games/checkers/settings").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_a_room_seats_the_caller_as_leader() {
    let app = app();
    let request = json_request("POST", "/rooms", json!({"creator_name": "alice", "room_name": "game night"}));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["user_id"].is_string());
    assert_eq!(body["room"]["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn joining_by_code_adds_a_second_member() {
    let app = app();

    let create = json_request("POST", "/rooms", json!({"creator_name": "alice", "room_name": "game night"}));
    let create_response = app.clone().oneshot(create).await.unwrap();
    let created = body_json(create_response).await;
    let code = created["room"]["code"].as_str().unwrap().to_string();

    let join = json_request("POST", "/rooms/join", json!({"code": code, "name": "bob"}));
    let join_response = app.oneshot(join).await.unwrap();
    assert_eq!(join_response.status(), StatusCode::OK);

    let joined = body_json(join_response).await;
    assert_eq!(joined["room"]["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn joining_an_unknown_code_is_not_found() {
    let request = json_request("POST", "/rooms/join", json!({"code": "ZZ9999", "name": "bob"}));
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_room_by_code_returns_the_room_without_joining_it() {
    let app = app();
    let create = json_request("POST", "/rooms", json!({"creator_name": "alice", "room_name": "game night"}));
    let created = body_json(app.clone().oneshot(create).await.unwrap()).await;
    let code = created["room"]["code"].as_str().unwrap().to_string();

    let lookup = Request::builder().uri(format!("/rooms/code/{code}")).body(Body::empty()).unwrap();
    let response = app.oneshot(lookup).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let room = body_json(response).await;
    assert_eq!(room["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn request_join_on_a_private_room_returns_a_pending_user_id() {
    let app = app();
    let create = json_request("POST", "/rooms", json!({"creator_name": "alice", "room_name": "invite only"}));
    let created = body_json(app.clone().oneshot(create).await.unwrap()).await;
    let code = created["room"]["code"].as_str().unwrap().to_string();

    let request_join = json_request("POST", "/rooms/request-join", json!({"code": code, "name": "carol"}));
    let response = app.oneshot(request_join).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["user_id"].is_string());
}
