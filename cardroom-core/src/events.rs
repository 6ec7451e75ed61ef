//! Event fan-out contract.
//!
//! The core never talks to a socket directly. It calls [`RoomEmitter`], an
//! interface the transport crate implements, with an envelope shaped as a
//! tagged enum the wire layer serializes, split into a broadcast-to-room
//! shape and a broadcast/unicast game shape (spec §4.10).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{GameId, RoomId, UserId};
use crate::room::Room;

/// The logical event a mutation just caused. Matches the non-exhaustive
/// event list in spec §4.10; transports key off [`Event::topic`] for
/// routing and logging, not off `Debug` formatting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    RoomCreated,
    UserJoined,
    UserReconnected,
    UserDisconnected,
    UserLeft,
    UserKicked,
    LeaderPromoted,
    TeamsSet,
    UserReadyStateChanged,
    GameSelected,
    RoomSettingsUpdated,
    GameSettingsUpdated,
    GameStarted,
    GamePaused,
    GameResumed,
    GameAborted,
    Sync,
    JoinRequest,
    TurnTimeout,
    PlayerMovedToSpectators,
    PlayerSlotClaimed,
}

impl Event {
    #[must_use]
    pub fn topic(self) -> &'static str {
        match self {
            Self::RoomCreated => "room_created",
            Self::UserJoined => "user_joined",
            Self::UserReconnected => "user_reconnected",
            Self::UserDisconnected => "user_disconnected",
            Self::UserLeft => "user_left",
            Self::UserKicked => "user_kicked",
            Self::LeaderPromoted => "leader_promoted",
            Self::TeamsSet => "teams_set",
            Self::UserReadyStateChanged => "user_ready_state_changed",
            Self::GameSelected => "game_selected",
            Self::RoomSettingsUpdated => "room_settings_updated",
            Self::GameSettingsUpdated => "game_settings_updated",
            Self::GameStarted => "game_started",
            Self::GamePaused => "game_paused",
            Self::GameResumed => "game_resumed",
            Self::GameAborted => "game_aborted",
            Self::Sync => "sync",
            Self::JoinRequest => "join_request",
            Self::TurnTimeout => "turn_timeout",
            Self::PlayerMovedToSpectators => "player_moved_to_spectators",
            Self::PlayerSlotClaimed => "player_slot_claimed",
        }
    }
}

/// Envelope broadcast to every connection in a room, carrying the full
/// public `Room` record plus whatever ad hoc data the causing operation
/// wants to attach (e.g. `{"reason": "reconnect_timeout"}`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomEnvelope {
    pub event: &'static str,
    pub room_state: Room,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Value::is_null", default)]
    pub custom_data: Value,
}

/// Envelope broadcast to the whole room with the public game projection, or
/// unicast to one participant with their private per-player projection.
/// `game_state`/`player_state` are opaque JSON produced by the owning game
/// module's `get_state`/`get_player_state` — the event layer doesn't know
/// the concrete Spades/Dominoes shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEnvelope {
    pub event: &'static str,
    pub game_id: GameId,
    pub state: Value,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Value::is_null", default)]
    pub custom_data: Value,
}

/// The core's only channel to the outside world: an emitter the transport
/// implements. Called synchronously (awaited) after a mutation commits and
/// before the room actor processes its next inbox message, so observers
/// always see causally consistent state (spec §5).
#[async_trait]
pub trait RoomEmitter: Send + Sync {
    async fn emit_to_room(&self, room_id: RoomId, envelope: RoomEnvelopeOrGame);
    async fn emit_to_user(&self, user_id: UserId, envelope: RoomEnvelopeOrGame);
}

/// Either shape of envelope a single emit call can carry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomEnvelopeOrGame {
    Room(RoomEnvelope),
    Game(GameEnvelope),
}

/// An emitter that drops every event. Used in tests that only care about
/// the resulting state, not the fan-out side effects.
pub struct NullEmitter;

#[async_trait]
impl RoomEmitter for NullEmitter {
    async fn emit_to_room(&self, _room_id: RoomId, _envelope: RoomEnvelopeOrGame) {}
    async fn emit_to_user(&self, _user_id: UserId, _envelope: RoomEnvelopeOrGame) {}
}

/// An emitter that records every call, for asserting fan-out ordering in
/// tests without a real transport.
#[derive(Default)]
pub struct RecordingEmitter {
    pub room_calls: tokio::sync::Mutex<Vec<(RoomId, RoomEnvelopeOrGame)>>,
    pub user_calls: tokio::sync::Mutex<Vec<(UserId, RoomEnvelopeOrGame)>>,
}

#[async_trait]
impl RoomEmitter for RecordingEmitter {
    async fn emit_to_room(&self, room_id: RoomId, envelope: RoomEnvelopeOrGame) {
        self.room_calls.lock().await.push((room_id, envelope));
    }

    async fn emit_to_user(&self, user_id: UserId, envelope: RoomEnvelopeOrGame) {
        self.user_calls.lock().await.push((user_id, envelope));
    }
}
