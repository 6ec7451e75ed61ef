//! Room lifecycle, registry, join requests, and the per-room actor.
//!
//! `Room` is the plain data record (spec §3); `lifecycle` holds the
//! operations that mutate it; `actor`/`messages` reify the per-room
//! message-passing worker spec §5 calls for; `registry` is the
//! process-wide, read-mostly index of rooms by id/code.

pub mod actor;
pub mod join_requests;
pub mod lifecycle;
pub mod messages;
pub mod registry;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::GameType;
use crate::ids::{GameId, RoomCode, RoomId, UserId};
use crate::settings::{GameSettings, RoomSettings};
use crate::user::User;

/// The seat-slot sentinel: an empty slot in a team layout.
pub type TeamSlot = Option<UserId>;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomState {
    Lobby,
    InGame,
    Ended,
}

/// A named, code-identified session container (spec §3).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub code: RoomCode,
    pub name: String,
    pub users: Vec<User>,
    pub leader_id: Option<UserId>,
    pub ready_states: HashMap<UserId, bool>,
    pub state: RoomState,
    pub game_id: Option<GameId>,
    pub selected_game_type: GameType,
    pub created_at: DateTime<Utc>,
    pub teams: Option<Vec<Vec<TeamSlot>>>,
    pub settings: RoomSettings,
    pub game_settings: HashMap<GameType, GameSettings>,
    pub is_paused: bool,
    pub paused_at: Option<DateTime<Utc>>,
    pub timeout_at: Option<DateTime<Utc>>,
    pub spectators: Vec<UserId>,
    pub kicked_user_ids: HashSet<UserId>,
}

impl Room {
    #[must_use]
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }

    #[must_use]
    pub fn is_leader(&self, user_id: UserId) -> bool {
        self.leader_id == Some(user_id)
    }

    #[must_use]
    pub fn is_spectator(&self, user_id: UserId) -> bool {
        self.spectators.contains(&user_id)
    }

    #[must_use]
    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    #[must_use]
    pub fn user_mut(&mut self, user_id: UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == user_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[must_use]
    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.users
            .iter()
            .filter(|u| u.connected)
            .map(|u| u.id)
            .collect()
    }

    /// Assert the class of invariants spec §8 quantifies over `Room`.
    /// Cheap enough to call from tests and from debug-only assertions.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        let leader_ok = self.users.is_empty() || self.leader_id.is_some_and(|l| self.is_member(l));
        let ready_keys: HashSet<UserId> = self.ready_states.keys().copied().collect();
        let expected_ready_keys: HashSet<UserId> = self
            .users
            .iter()
            .map(|u| u.id)
            .filter(|id| !self.is_spectator(*id))
            .collect();
        let ready_ok = ready_keys == expected_ready_keys;
        let game_id_ok = self.game_id.is_some() == matches!(self.state, RoomState::InGame);
        let kick_disjoint = self.kicked_user_ids.iter().all(|id| !self.is_member(*id));
        leader_ok && ready_ok && game_id_ok && kick_disjoint
    }
}
