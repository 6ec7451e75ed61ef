//! Room and game-catalog HTTP handlers (spec §6).
//!
//! A client's usual path through this API: `POST /rooms` (or `/rooms/join`)
//! to become a room member and get back a `user_id`, then open the
//! WebSocket in [`super::websocket`] with that `(room_id, user_id)` pair to
//! register a live connection and start receiving fan-out.
//!
//! # Examples
//!
//! Create a room:
//! ```bash
//! curl -X POST http://localhost:6969/rooms \
//!   -H "Content-Type: application/json" \
//!   -d '{"creator_name": "alice", "room_name": "table talk"}'
//! ```
//!
//! Join by code:
//! ```bash
//! curl -X POST http://localhost:6969/rooms/join \
//!   -H "Content-Type: application/json" \
//!   -d '{"code": "AB12CD", "name": "bob"}'
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use cardroom_core::error::CoreError;
use cardroom_core::game::{self, GameType};
use cardroom_core::ids::{RoomCode, UserId};
use cardroom_core::room::messages::{RoomMessage, RoomResponse};
use cardroom_core::room::Room;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: Option<&'static str>,
}

fn error_response(err: CoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err.kind() {
        cardroom_core::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        cardroom_core::ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        cardroom_core::ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        cardroom_core::ErrorKind::Conflict => StatusCode::CONFLICT,
        cardroom_core::ErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        cardroom_core::ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        cardroom_core::ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let code = err.code();
    (status, Json(ErrorResponse { error: err.to_string(), code }))
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub creator_name: String,
    pub room_name: String,
}

#[derive(Debug, Serialize)]
pub struct RoomJoinedResponse {
    pub user_id: UserId,
    pub room: Room,
}

/// Create a new room. The caller is seated as sole member and leader.
///
/// # Response
///
/// `201 Created` with the new `user_id` and the room's public state.
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomJoinedResponse>), (StatusCode, Json<ErrorResponse>)> {
    let user_id = UserId::new();
    let handle = state
        .registry
        .create_room(user_id, request.creator_name, request.room_name)
        .await
        .map_err(error_response)?;

    let room = fetch_room_snapshot(&handle).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(RoomJoinedResponse { user_id, room })))
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub bypass_private: bool,
}

/// Join a room by its 6-character code (spec §4.1 "Join by code").
///
/// # Errors
///
/// - `404 Not Found`: no room with that code
/// - `403 Forbidden` (`PRIVATE_ROOM`): room is private and `bypass_private` wasn't set
/// - `403 Forbidden` (`KICKED`): caller was previously kicked from this room
/// - `400 Bad Request`: room is full
pub async fn join_room(
    State(state): State<AppState>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<RoomJoinedResponse>, (StatusCode, Json<ErrorResponse>)> {
    let code = RoomCode::normalize(&request.code);
    let handle = state
        .registry
        .get_by_code(&code)
        .await
        .ok_or_else(|| error_response(cardroom_core::error::RoomError::RoomNotFound.into()))?;

    let user_id = UserId::new();
    handle
        .send(|respond_to| RoomMessage::JoinRoom {
            user_id,
            name: request.name,
            bypass_private: request.bypass_private,
            respond_to,
        })
        .await
        .map_err(error_response)?;

    let room = fetch_room_snapshot(&handle).await.map_err(error_response)?;
    Ok(Json(RoomJoinedResponse { user_id, room }))
}

#[derive(Debug, Deserialize)]
pub struct RequestJoinRequest {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RequestJoinResponse {
    pub user_id: UserId,
}

/// Submit a join request for a private room the caller wasn't invited to
/// (spec §4.4). The leader must `acceptJoin`/`rejectJoin` over the
/// WebSocket before this caller becomes a member.
///
/// # Errors
///
/// - `429 Too Many Requests` (`RATE_LIMITED`): cooldown or attempt cap hit
pub async fn request_join(
    State(state): State<AppState>,
    Json(request): Json<RequestJoinRequest>,
) -> Result<Json<RequestJoinResponse>, (StatusCode, Json<ErrorResponse>)> {
    let code = RoomCode::normalize(&request.code);
    let handle = state
        .registry
        .get_by_code(&code)
        .await
        .ok_or_else(|| error_response(cardroom_core::error::RoomError::RoomNotFound.into()))?;

    let user_id = UserId::new();
    handle
        .send(|respond_to| RoomMessage::RequestJoin { user_id, name: request.name, respond_to })
        .await
        .map_err(error_response)?;

    Ok(Json(RequestJoinResponse { user_id }))
}

/// Look up a room's current public state by its code, without joining it.
///
/// # Errors
///
/// - `404 Not Found`: no room with that code
pub async fn get_room_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Room>, (StatusCode, Json<ErrorResponse>)> {
    let code = RoomCode::normalize(&code);
    let handle = state
        .registry
        .get_by_code(&code)
        .await
        .ok_or_else(|| error_response(cardroom_core::error::RoomError::RoomNotFound.into()))?;

    fetch_room_snapshot(&handle).await.map(Json).map_err(error_response)
}

async fn fetch_room_snapshot(
    handle: &cardroom_core::room::actor::RoomHandle,
) -> Result<Room, CoreError> {
    let response = handle
        .send(|respond_to| RoomMessage::GetState { user_id: None, respond_to })
        .await?;
    match response {
        RoomResponse::Room(room) => Ok(*room),
        _ => Err(CoreError::Internal("unexpected response to GetState".into())),
    }
}

/// List every game type this server can host, with its metadata (spec §4.5).
pub async fn list_games() -> Json<Vec<Value>> {
    let games = GameType::all()
        .iter()
        .map(|&game_type| {
            let meta = game::metadata(game_type);
            json!({
                "gameType": meta.game_type,
                "displayName": meta.display_name,
                "requiresTeams": meta.requires_teams,
                "minPlayers": meta.min_players,
                "maxPlayers": meta.max_players,
                "numTeams": meta.num_teams,
                "playersPerTeam": meta.players_per_team,
                "defaultSettings": meta.default_settings,
            })
        })
        .collect();
    Json(games)
}

fn parse_game_type(raw: &str) -> Option<GameType> {
    match raw {
        "spades" => Some(GameType::Spades),
        "dominoes" => Some(GameType::Dominoes),
        _ => None,
    }
}

/// Describe one game type's settings schema, for building a settings form.
///
/// # Errors
///
/// - `404 Not Found`: unknown game type in the path
pub async fn game_settings_schema(
    Path(game_type): Path<String>,
) -> Result<Json<Vec<Value>>, (StatusCode, Json<ErrorResponse>)> {
    let Some(game_type) = parse_game_type(&game_type) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse { error: "unknown game type".into(), code: None }),
        ));
    };

    let definitions = game::metadata(game_type)
        .settings_definitions
        .into_iter()
        .map(|def| {
            json!({
                "key": def.key,
                "type": format!("{:?}", def.setting_type),
                "default": def.default,
                "min": def.min,
                "max": def.max,
                "step": def.step,
                "options": def.options,
                "dependsOn": def.depends_on.map(|(key, value)| json!({"key": key, "value": value})),
            })
        })
        .collect();

    Ok(Json(definitions))
}

/// Liveness/readiness probe for load balancers.
pub async fn healthz(State(state): State<AppState>) -> Response {
    let body = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": state.registry.room_count().await,
        "connections": state.ws_hub.connections_active().await,
    });
    (StatusCode::OK, Json(body)).into_response()
}
