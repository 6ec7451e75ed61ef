//! Room actor message types (spec §6 transport interface, generalized
//! into an inbox a [`super::actor::RoomActor`] drains in arrival order).

use serde_json::{Map, Value};
use tokio::sync::oneshot;

use crate::error::CoreError;
use crate::game::cards::Card;
use crate::game::dominoes::board::Side;
use crate::game::dominoes::tiles::Tile;
use crate::game::GameType;
use crate::ids::UserId;

use super::join_requests::JoinRequest;
use super::{Room, TeamSlot};

pub type Responder<T> = oneshot::Sender<Result<T, CoreError>>;

/// Every request a room worker understands. One worker drains exactly one
/// room's inbox (spec §5 scheduling model); cross-room ordering is not
/// promised.
#[derive(Debug)]
pub enum RoomMessage {
    JoinRoom {
        user_id: UserId,
        name: String,
        bypass_private: bool,
        respond_to: Responder<RoomResponse>,
    },
    /// A transport connection for `user_id` came up. Socket-level
    /// bookkeeping (at-most-one-connection-per-user) is the server
    /// crate's job; by the time this reaches the room, that's decided.
    Connect {
        user_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    Disconnect {
        user_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    LeaveGame {
        user_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    ToggleReady {
        user_id: UserId,
        ready: bool,
        respond_to: Responder<RoomResponse>,
    },
    KickUser {
        leader_id: UserId,
        target: UserId,
        respond_to: Responder<RoomResponse>,
    },
    PromoteLeader {
        leader_id: UserId,
        new_leader: UserId,
        respond_to: Responder<RoomResponse>,
    },
    SetTeams {
        leader_id: UserId,
        teams: Vec<Vec<TeamSlot>>,
        strict: bool,
        respond_to: Responder<RoomResponse>,
    },
    RandomizeTeams {
        leader_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    SelectGame {
        leader_id: UserId,
        game_type: GameType,
        respond_to: Responder<RoomResponse>,
    },
    UpdateRoomSettings {
        leader_id: UserId,
        max_players: Option<usize>,
        is_private: Option<bool>,
        respond_to: Responder<RoomResponse>,
    },
    UpdateGameSettings {
        leader_id: UserId,
        game_type: GameType,
        raw: Map<String, Value>,
        respond_to: Responder<RoomResponse>,
    },
    StartGame {
        leader_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    AbortGame {
        leader_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    CloseRoom {
        leader_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    ClaimSlot {
        spectator_id: UserId,
        target: UserId,
        respond_to: Responder<RoomResponse>,
    },
    RequestJoin {
        user_id: UserId,
        name: String,
        respond_to: Responder<RoomResponse>,
    },
    AcceptJoin {
        leader_id: UserId,
        requester_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    RejectJoin {
        leader_id: UserId,
        requester_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    PlaceBid {
        user_id: UserId,
        amount: i64,
        blind: bool,
        respond_to: Responder<RoomResponse>,
    },
    PlayCard {
        user_id: UserId,
        card: Card,
        respond_to: Responder<RoomResponse>,
    },
    PlaceTile {
        user_id: UserId,
        tile: Tile,
        side: Side,
        respond_to: Responder<RoomResponse>,
    },
    Pass {
        user_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    ContinueAfterTrickResult {
        user_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    ContinueAfterRoundSummary {
        user_id: UserId,
        respond_to: Responder<RoomResponse>,
    },
    GetState {
        user_id: Option<UserId>,
        respond_to: Responder<RoomResponse>,
    },
    /// Internal: a timer fired. These never originate from the
    /// transport and never reply.
    TurnTimeout {
        game_id: crate::ids::GameId,
    },
    ReconnectAbort {
        user_id: UserId,
    },
    ScheduledDeletionDue,
}

/// Every successful outcome a [`RoomMessage`] can produce. Kept as one
/// enum so the actor's reply path is uniform regardless of request kind.
#[derive(Clone, Debug)]
pub enum RoomResponse {
    Unit,
    Room(Box<Room>),
    PublicGameState(Value),
    PlayerGameState(Value),
    JoinRequests(Vec<JoinRequest>),
}
