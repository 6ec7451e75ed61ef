//! WebSocket handler for real-time room/game updates.
//!
//! Once a client has joined a room over HTTP ([`super::rooms::join_room`]
//! or [`super::rooms::create_room`]), it opens a socket here to register
//! itself as connected (spec §4.3 "Register") and to receive the room's
//! event fan-out. All further room and game actions arrive as typed
//! messages over this same socket.
//!
//! # Connection flow
//!
//! 1. `GET /ws?room_id=<uuid>&user_id=<uuid>`
//! 2. The registry registers the socket, pausing/resuming the room's game
//!    as needed; any socket this one supersedes is force-closed.
//! 3. A send task forwards the hub's fan-out for this room to the socket.
//! 4. A receive loop parses each incoming frame as a [`ClientMessage`] and
//!    dispatches it to the room actor, acking the result back to the
//!    sender on the same socket.
//! 5. On disconnect, the registry is told so reconnect/pause bookkeeping
//!    can run.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cardroom_core::error::CoreError;
use cardroom_core::game::cards::Card;
use cardroom_core::game::dominoes::board::Side;
use cardroom_core::game::dominoes::tiles::Tile;
use cardroom_core::game::GameType;
use cardroom_core::ids::{RoomId, SocketId, UserId};
use cardroom_core::room::messages::{RoomMessage, RoomResponse};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::rate_limiter::RateLimiter;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    room_id: Uuid,
    user_id: Uuid,
}

/// Every action a connected client can send, one message per frame.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    ToggleReady { ready: bool },
    KickUser { target: Uuid },
    PromoteLeader { new_leader: Uuid },
    SetTeams { teams: Vec<Vec<Option<Uuid>>>, strict: bool },
    RandomizeTeams,
    SelectGame { game_type: GameType },
    UpdateRoomSettings { max_players: Option<usize>, is_private: Option<bool> },
    UpdateGameSettings { game_type: GameType, settings: Map<String, Value> },
    StartGame,
    AbortGame,
    CloseRoom,
    ClaimSlot { target: Uuid },
    RequestJoin { name: String },
    AcceptJoin { requester_id: Uuid },
    RejectJoin { requester_id: Uuid },
    PlaceBid { amount: i64, blind: bool },
    PlayCard { card: Card },
    PlaceTile { tile: Tile, side: Side },
    Pass,
    ContinueAfterTrickResult,
    ContinueAfterRoundSummary,
    LeaveGame,
    GetState,
}

/// What goes back to the sender of a [`ClientMessage`], distinct from the
/// room/game envelopes the hub fans out to everyone.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Ack {
    Ack,
    Room { room: Box<cardroom_core::room::Room> },
    GameState { state: Value },
    PlayerGameState { state: Value },
    JoinRequests { requests: Vec<cardroom_core::room::join_requests::JoinRequest> },
    Error { message: String, code: Option<&'static str> },
}

impl From<Result<RoomResponse, CoreError>> for Ack {
    fn from(result: Result<RoomResponse, CoreError>) -> Self {
        match result {
            Ok(RoomResponse::Unit) => Ack::Ack,
            Ok(RoomResponse::Room(room)) => Ack::Room { room },
            Ok(RoomResponse::PublicGameState(state)) => Ack::GameState { state },
            Ok(RoomResponse::PlayerGameState(state)) => Ack::PlayerGameState { state },
            Ok(RoomResponse::JoinRequests(requests)) => Ack::JoinRequests { requests },
            Err(err) => Ack::Error {
                message: err.to_string(),
                code: err.code(),
            },
        }
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let room_id = RoomId(query.room_id);
    let user_id = UserId(query.user_id);

    let Some(room) = state.registry.get(room_id).await else {
        return (StatusCode::NOT_FOUND, "room not found").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, user_id, room))
}

async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    room_id: RoomId,
    user_id: UserId,
    room: cardroom_core::room::actor::RoomHandle,
) {
    let socket_id = SocketId::new();
    let (mut sink, mut stream) = socket.split();

    let outcome = match state.registry.connect(socket_id, room_id, user_id).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let ack = Ack::from(Err::<RoomResponse, _>(err));
            if let Ok(json) = serde_json::to_string(&ack) {
                let _ = sink.send(Message::Text(json.into())).await;
            }
            let _ = sink.close().await;
            return;
        }
    };

    if let Some(superseded) = outcome.superseded {
        state.ws_hub.force_close(superseded).await;
    }

    let (outbox_tx, mut outbox_rx) = mpsc::channel::<String>(64);
    let (kill_tx, mut kill_rx) = oneshot::channel();
    state
        .ws_hub
        .register(room_id, user_id, socket_id, outbox_tx, kill_tx)
        .await;

    tracing::info!(room_id = %room_id, user_id = %user_id, socket_id = %socket_id, "socket connected");

    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(text) = outbox_rx.recv() => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = &mut kill_rx => {
                    let _ = sink.close().await;
                    break;
                }
                else => break,
            }
        }
    });

    let mut limiter = RateLimiter::burst();

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let ack = if !limiter.check() {
                    Ack::Error {
                        message: "too many messages, slow down".into(),
                        code: Some("RATE_LIMITED"),
                    }
                } else {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => dispatch(&room, user_id, client_msg).await,
                        Err(err) => Ack::Error {
                            message: format!("invalid message: {err}"),
                            code: None,
                        },
                    }
                };
                if let Ok(json) = serde_json::to_string(&ack) {
                    let _ = state.ws_hub.emit_direct(socket_id, json).await;
                }
            }
            Ok(Message::Close(_)) => break,
            Err(err) => {
                tracing::warn!(socket_id = %socket_id, error = %err, "websocket error");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    state.ws_hub.unregister(socket_id).await;
    state.registry.disconnect(socket_id).await;
    tracing::info!(room_id = %room_id, user_id = %user_id, socket_id = %socket_id, "socket disconnected");
}

async fn dispatch(
    room: &cardroom_core::room::actor::RoomHandle,
    user_id: UserId,
    msg: ClientMessage,
) -> Ack {
    let result = match msg {
        ClientMessage::ToggleReady { ready } => {
            room.send(|respond_to| RoomMessage::ToggleReady { user_id, ready, respond_to }).await
        }
        ClientMessage::KickUser { target } => {
            room.send(|respond_to| RoomMessage::KickUser {
                leader_id: user_id,
                target: UserId(target),
                respond_to,
            })
            .await
        }
        ClientMessage::PromoteLeader { new_leader } => {
            room.send(|respond_to| RoomMessage::PromoteLeader {
                leader_id: user_id,
                new_leader: UserId(new_leader),
                respond_to,
            })
            .await
        }
        ClientMessage::SetTeams { teams, strict } => {
            let teams = teams
                .into_iter()
                .map(|slot_row| slot_row.into_iter().map(|slot| slot.map(UserId)).collect())
                .collect();
            room.send(|respond_to| RoomMessage::SetTeams {
                leader_id: user_id,
                teams,
                strict,
                respond_to,
            })
            .await
        }
        ClientMessage::RandomizeTeams => {
            room.send(|respond_to| RoomMessage::RandomizeTeams { leader_id: user_id, respond_to }).await
        }
        ClientMessage::SelectGame { game_type } => {
            room.send(|respond_to| RoomMessage::SelectGame { leader_id: user_id, game_type, respond_to }).await
        }
        ClientMessage::UpdateRoomSettings { max_players, is_private } => {
            room.send(|respond_to| RoomMessage::UpdateRoomSettings {
                leader_id: user_id,
                max_players,
                is_private,
                respond_to,
            })
            .await
        }
        ClientMessage::UpdateGameSettings { game_type, settings } => {
            room.send(|respond_to| RoomMessage::UpdateGameSettings {
                leader_id: user_id,
                game_type,
                raw: settings,
                respond_to,
            })
            .await
        }
        ClientMessage::StartGame => {
            room.send(|respond_to| RoomMessage::StartGame { leader_id: user_id, respond_to }).await
        }
        ClientMessage::AbortGame => {
            room.send(|respond_to| RoomMessage::AbortGame { leader_id: user_id, respond_to }).await
        }
        ClientMessage::CloseRoom => {
            room.send(|respond_to| RoomMessage::CloseRoom { leader_id: user_id, respond_to }).await
        }
        ClientMessage::ClaimSlot { target } => {
            room.send(|respond_to| RoomMessage::ClaimSlot {
                spectator_id: user_id,
                target: UserId(target),
                respond_to,
            })
            .await
        }
        ClientMessage::RequestJoin { name } => {
            room.send(|respond_to| RoomMessage::RequestJoin { user_id, name, respond_to }).await
        }
        ClientMessage::AcceptJoin { requester_id } => {
            room.send(|respond_to| RoomMessage::AcceptJoin {
                leader_id: user_id,
                requester_id: UserId(requester_id),
                respond_to,
            })
            .await
        }
        ClientMessage::RejectJoin { requester_id } => {
            room.send(|respond_to| RoomMessage::RejectJoin {
                leader_id: user_id,
                requester_id: UserId(requester_id),
                respond_to,
            })
            .await
        }
        ClientMessage::PlaceBid { amount, blind } => {
            room.send(|respond_to| RoomMessage::PlaceBid { user_id, amount, blind, respond_to }).await
        }
        ClientMessage::PlayCard { card } => {
            room.send(|respond_to| RoomMessage::PlayCard { user_id, card, respond_to }).await
        }
        ClientMessage::PlaceTile { tile, side } => {
            room.send(|respond_to| RoomMessage::PlaceTile { user_id, tile, side, respond_to }).await
        }
        ClientMessage::Pass => room.send(|respond_to| RoomMessage::Pass { user_id, respond_to }).await,
        ClientMessage::ContinueAfterTrickResult => {
            room.send(|respond_to| RoomMessage::ContinueAfterTrickResult { user_id, respond_to }).await
        }
        ClientMessage::ContinueAfterRoundSummary => {
            room.send(|respond_to| RoomMessage::ContinueAfterRoundSummary { user_id, respond_to }).await
        }
        ClientMessage::LeaveGame => {
            room.send(|respond_to| RoomMessage::LeaveGame { user_id, respond_to }).await
        }
        ClientMessage::GetState => {
            room.send(|respond_to| RoomMessage::GetState { user_id: Some(user_id), respond_to }).await
        }
    };
    Ack::from(result)
}
