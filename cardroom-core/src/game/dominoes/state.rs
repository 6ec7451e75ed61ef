//! Dominoes state record and its public/per-player projections.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::rotate_to_seat;
use crate::ids::{GameId, RoomId, UserId};
use crate::settings::DominoesSettings;

use super::board::Board;
use super::tiles::Tile;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DominoesPhase {
    Playing,
    RoundSummary,
    Finished,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DominoesState {
    pub game_id: GameId,
    pub room_id: RoomId,
    pub settings: DominoesSettings,
    pub play_order: Vec<UserId>,
    pub hands: HashMap<UserId, Vec<Tile>>,
    pub boneyard: Vec<Tile>,
    pub board: Board,
    pub current_turn_index: usize,
    pub phase: DominoesPhase,
    pub consecutive_passes: u32,
    pub player_scores: HashMap<UserId, i64>,
    pub round_winner_id: Option<UserId>,
    pub is_tie: bool,
    pub last_round_pip_counts: Option<HashMap<UserId, u32>>,
    pub turn_started_at: Option<DateTime<Utc>>,
    pub connected: HashMap<UserId, bool>,
    pub history: Vec<String>,
}

impl DominoesState {
    pub fn push_history(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    #[must_use]
    pub fn public_view(&self) -> DominoesPublicState {
        DominoesPublicState {
            game_id: self.game_id,
            phase: self.phase,
            play_order: self.play_order.clone(),
            hands_counts: self.hands.iter().map(|(id, h)| (*id, h.len())).collect(),
            boneyard_count: self.boneyard.len(),
            board: self.board.clone(),
            current_turn_index: self.current_turn_index,
            consecutive_passes: self.consecutive_passes,
            player_scores: self.player_scores.clone(),
            round_winner_id: self.round_winner_id,
            is_tie: self.is_tie,
            last_round_pip_counts: self.last_round_pip_counts.clone(),
            turn_started_at: self.turn_started_at,
        }
    }

    #[must_use]
    pub fn player_view(&self, user_id: UserId) -> DominoesPlayerState {
        DominoesPlayerState {
            public: self.public_view(),
            hand: self.hands.get(&user_id).cloned().unwrap_or_default(),
            local_ordering: rotate_to_seat(&self.play_order, user_id),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DominoesPublicState {
    pub game_id: GameId,
    pub phase: DominoesPhase,
    pub play_order: Vec<UserId>,
    pub hands_counts: HashMap<UserId, usize>,
    pub boneyard_count: usize,
    pub board: Board,
    pub current_turn_index: usize,
    pub consecutive_passes: u32,
    pub player_scores: HashMap<UserId, i64>,
    pub round_winner_id: Option<UserId>,
    pub is_tie: bool,
    pub last_round_pip_counts: Option<HashMap<UserId, u32>>,
    pub turn_started_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DominoesPlayerState {
    #[serde(flatten)]
    pub public: DominoesPublicState,
    pub hand: Vec<Tile>,
    pub local_ordering: Vec<UserId>,
}
