//! Game module framework (spec §4.5): a registry of game types, each
//! bundling init/reducer/projection functions behind a plain enum rather
//! than a trait object, since the room only ever hosts one of two concrete
//! games at a time.

pub mod cards;
pub mod dominoes;
pub mod spades;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::error::{CoreError, GameError};
use crate::ids::{GameId, RoomId, UserId};
use crate::room::Room;
use crate::settings::schema::SettingDefinition;
use crate::settings::GameSettings;

pub use dominoes::state::DominoesState;
pub use spades::state::SpadesState;

/// The catalog of game types a room can host. Adding a new game means
/// adding a variant here plus a module under `game/`; the rest of the
/// system (settings, registry, actor) is written against this enum.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Spades,
    Dominoes,
}

impl GameType {
    #[must_use]
    pub fn all() -> &'static [GameType] {
        &[GameType::Spades, GameType::Dominoes]
    }
}

/// Static facts about a game type, independent of any particular instance
/// (spec §4.5 metadata record).
#[derive(Clone, Debug, Serialize)]
pub struct GameMetadata {
    pub game_type: GameType,
    pub display_name: &'static str,
    pub requires_teams: bool,
    pub min_players: usize,
    pub max_players: usize,
    pub num_teams: Option<usize>,
    pub players_per_team: Option<usize>,
    #[serde(skip)]
    pub settings_definitions: Vec<SettingDefinition>,
    pub default_settings: GameSettings,
}

#[must_use]
pub fn metadata(game_type: GameType) -> GameMetadata {
    match game_type {
        GameType::Spades => GameMetadata {
            game_type,
            display_name: "Spades",
            requires_teams: true,
            min_players: 4,
            max_players: 4,
            num_teams: Some(2),
            players_per_team: Some(2),
            settings_definitions: crate::settings::spades::definitions(),
            default_settings: GameSettings::default_for(game_type),
        },
        GameType::Dominoes => GameMetadata {
            game_type,
            display_name: "Dominoes",
            requires_teams: false,
            min_players: 4,
            max_players: 4,
            num_teams: None,
            players_per_team: None,
            settings_definitions: crate::settings::dominoes::definitions(),
            default_settings: GameSettings::default_for(game_type),
        },
    }
}

/// The live state of one in-progress game, tagged by which module owns it.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameState {
    Spades(SpadesState),
    Dominoes(DominoesState),
}

impl GameState {
    #[must_use]
    pub fn game_type(&self) -> GameType {
        match self {
            Self::Spades(_) => GameType::Spades,
            Self::Dominoes(_) => GameType::Dominoes,
        }
    }

    #[must_use]
    pub fn game_id(&self) -> GameId {
        match self {
            Self::Spades(s) => s.game_id,
            Self::Dominoes(s) => s.game_id,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Spades(s) => s.phase == spades::state::SpadesPhase::Finished,
            Self::Dominoes(s) => s.phase == dominoes::state::DominoesPhase::Finished,
        }
    }

    #[must_use]
    pub fn turn_started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Spades(s) => s.turn_started_at,
            Self::Dominoes(s) => s.turn_started_at,
        }
    }

    #[must_use]
    pub fn current_turn_user(&self) -> Option<UserId> {
        match self {
            Self::Spades(s) => s.play_order.get(s.current_turn_index).copied(),
            Self::Dominoes(s) => s.play_order.get(s.current_turn_index).copied(),
        }
    }

    #[must_use]
    pub fn participants(&self) -> &[UserId] {
        match self {
            Self::Spades(s) => &s.play_order,
            Self::Dominoes(s) => &s.play_order,
        }
    }
}

/// Every inbound mutation a game module reducer understands (spec §4.6,
/// §4.8). `timeout_seconds` in `StartGame` is carried by the room, not
/// here; this enum is purely the in-game action surface.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GameAction {
    PlaceBid { amount: i64, blind: bool },
    PlayCard { card: cards::Card },
    ContinueAfterTrickResult,
    ContinueAfterRoundSummary,
    PlaceTile { tile: dominoes::tiles::Tile, side: dominoes::board::Side },
    Pass,
}

/// Build a fresh game state for `game_type` from the room's current
/// membership and (already-validated) settings.
pub fn init(
    game_type: GameType,
    room: &Room,
    game_id: GameId,
    settings: &GameSettings,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<GameState, CoreError> {
    match (game_type, settings) {
        (GameType::Spades, GameSettings::Spades(s)) => {
            Ok(GameState::Spades(spades::reducer::init(room, game_id, s, rng, now)?))
        }
        (GameType::Dominoes, GameSettings::Dominoes(s)) => {
            Ok(GameState::Dominoes(dominoes::reducer::init(room, game_id, s, rng, now)?))
        }
        _ => Err(GameError::UnknownPlayer.into()),
    }
}

/// The single mutation entry point (spec §4.5 `dispatch`): looks up
/// nothing itself (the caller holds `state`), calls the owning module's
/// reducer, and returns the new state. On error the caller must discard
/// the `Err` without touching `state` — reducers never partially mutate.
pub fn reduce(
    state: &GameState,
    user_id: UserId,
    action: GameAction,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<GameState, CoreError> {
    match state {
        GameState::Spades(s) => {
            spades::reducer::reduce(s, user_id, action, rng, now).map(GameState::Spades)
        }
        GameState::Dominoes(s) => {
            dominoes::reducer::reduce(s, user_id, action, rng, now).map(GameState::Dominoes)
        }
    }
}

/// Minimum-players gate: both shipped games require exactly four
/// connected participants to keep playing (spec §4.6, §4.8).
#[must_use]
pub fn check_minimum_players(state: &GameState, connected: &[UserId]) -> bool {
    let seats: &[UserId] = match state {
        GameState::Spades(s) => &s.play_order,
        GameState::Dominoes(s) => &s.play_order,
    };
    seats.iter().all(|seat| connected.contains(seat))
}

/// The auto-action the turn timer dispatches on timeout (spec §4.9).
/// `None` means no seat is currently waiting on input (e.g. `trick-result`
/// and `round-summary` are UI-confirmed, not timed).
#[must_use]
pub fn timeout_action(state: &GameState) -> Option<GameAction> {
    match state {
        GameState::Spades(s) => spades::reducer::timeout_action(s),
        GameState::Dominoes(s) => dominoes::reducer::timeout_action(s),
    }
}

pub fn on_disconnect(state: &mut GameState, user_id: UserId) {
    match state {
        GameState::Spades(s) => spades::reducer::on_disconnect(s, user_id),
        GameState::Dominoes(s) => dominoes::reducer::on_disconnect(s, user_id),
    }
}

pub fn on_reconnect(state: &mut GameState, user_id: UserId) {
    match state {
        GameState::Spades(s) => spades::reducer::on_reconnect(s, user_id),
        GameState::Dominoes(s) => dominoes::reducer::on_reconnect(s, user_id),
    }
}

/// A spectator claims a disconnected player's seat (spec event
/// `player_slot_claimed`): the hand/tiles and turn position transfer, the
/// display name updates, connectivity flips to connected.
pub fn transfer_slot(state: &mut GameState, from: UserId, to: UserId) {
    match state {
        GameState::Spades(s) => spades::reducer::transfer_slot(s, from, to),
        GameState::Dominoes(s) => dominoes::reducer::transfer_slot(s, from, to),
    }
}

/// Project a state into the shape broadcast to the whole room: hands are
/// replaced with counts.
#[must_use]
pub fn get_state(state: &GameState) -> serde_json::Value {
    match state {
        GameState::Spades(s) => serde_json::to_value(s.public_view()),
        GameState::Dominoes(s) => serde_json::to_value(s.public_view()),
    }
    .expect("projection types are always serializable")
}

/// Project a state into one participant's private view: their own hand
/// plus a `localOrdering` rotation of the play order starting at their
/// seat (spec §4.5).
#[must_use]
pub fn get_player_state(state: &GameState, user_id: UserId) -> serde_json::Value {
    match state {
        GameState::Spades(s) => serde_json::to_value(s.player_view(user_id)),
        GameState::Dominoes(s) => serde_json::to_value(s.player_view(user_id)),
    }
    .expect("projection types are always serializable")
}

/// Rotate `order` so that `user_id`'s seat comes first, wrapping around.
/// Used by both games' `getPlayerState` to build `localOrdering`.
#[must_use]
pub fn rotate_to_seat(order: &[UserId], user_id: UserId) -> Vec<UserId> {
    match order.iter().position(|&u| u == user_id) {
        Some(idx) => order
            .iter()
            .cycle()
            .skip(idx)
            .take(order.len())
            .copied()
            .collect(),
        None => order.to_vec(),
    }
}

/// Team index (0 or 1) for a Spades seat: play order alternates teams so
/// index parity identifies the team (spec §4.6 init).
#[must_use]
pub fn team_of_seat(seat_index: usize) -> usize {
    seat_index % 2
}

pub type PartialSettings = Map<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_to_seat_wraps_around() {
        let u1 = UserId::new();
        let u2 = UserId::new();
        let u3 = UserId::new();
        let order = vec![u1, u2, u3];
        assert_eq!(rotate_to_seat(&order, u2), vec![u2, u3, u1]);
        assert_eq!(rotate_to_seat(&order, u1), vec![u1, u2, u3]);
    }

    #[test]
    fn team_of_seat_alternates() {
        assert_eq!(team_of_seat(0), 0);
        assert_eq!(team_of_seat(1), 1);
        assert_eq!(team_of_seat(2), 0);
        assert_eq!(team_of_seat(3), 1);
    }
}
