//! Spades state record and its public/per-player projections.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::cards::Card;
use crate::game::rotate_to_seat;
use crate::ids::{GameId, RoomId, UserId};
use crate::settings::SpadesSettings;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpadesPhase {
    Bidding,
    Playing,
    TrickResult,
    RoundSummary,
    Finished,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BidKind {
    Normal,
    Nil,
    Blind,
    BlindNil,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Bid {
    pub amount: i64,
    pub blind: bool,
}

impl Bid {
    #[must_use]
    pub fn kind(self) -> BidKind {
        match (self.amount == 0, self.blind) {
            (true, true) => BidKind::BlindNil,
            (true, false) => BidKind::Nil,
            (false, true) => BidKind::Blind,
            (false, false) => BidKind::Normal,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Trick {
    pub lead_suit: Option<crate::game::cards::Suit>,
    pub plays: Vec<(UserId, Card)>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CompletedTrick {
    pub plays: Vec<(UserId, Card)>,
    pub winner_id: UserId,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct TeamRoundBreakdown {
    pub team_bid: i64,
    pub tricks_won: u32,
    pub base_points: i64,
    pub bag_points: i64,
    pub bag_penalty: i64,
    pub nil_bonus: i64,
    pub nil_penalty: i64,
    pub blind_bonus: i64,
    pub blind_penalty: i64,
    pub blind_nil_bonus: i64,
    pub blind_nil_penalty: i64,
    pub round_score: i64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct RoundScoreBreakdown {
    pub teams: [TeamRoundBreakdown; 2],
}

/// The full, authoritative state of one Spades game. Owned exclusively by
/// the room worker holding the game; only `reducer` functions mutate it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SpadesState {
    pub game_id: GameId,
    pub room_id: RoomId,
    pub settings: SpadesSettings,
    /// Alternates teams by index parity: `team_of_seat(i) = i % 2`.
    pub play_order: Vec<UserId>,
    pub hands: HashMap<UserId, Vec<Card>>,
    pub dealer_index: usize,
    pub current_turn_index: usize,
    pub phase: SpadesPhase,
    pub bids: HashMap<UserId, Bid>,
    pub spades_broken: bool,
    pub current_trick: Trick,
    pub completed_tricks: Vec<CompletedTrick>,
    pub last_trick_winner_id: Option<UserId>,
    pub last_trick_winning_card: Option<Card>,
    pub team_scores: [i64; 2],
    pub accumulated_bags: [i64; 2],
    pub team_eligible_for_blind: [bool; 2],
    pub round_score_breakdown: Option<RoundScoreBreakdown>,
    pub round_trick_counts: Option<[u32; 2]>,
    pub winner_team_id: Option<u8>,
    pub is_tie: bool,
    pub turn_started_at: Option<DateTime<Utc>>,
    pub connected: HashMap<UserId, bool>,
    /// Append-only log of notable transitions, observable in-order
    /// (spec §9 "reducer purity").
    pub history: Vec<String>,
}

impl SpadesState {
    #[must_use]
    pub fn team_of(&self, user_id: UserId) -> Option<usize> {
        self.play_order
            .iter()
            .position(|&u| u == user_id)
            .map(super::super::team_of_seat)
    }

    #[must_use]
    pub fn all_connected(&self) -> bool {
        self.connected.values().all(|&c| c)
    }

    pub fn push_history(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    #[must_use]
    pub fn public_view(&self) -> SpadesPublicState {
        SpadesPublicState {
            game_id: self.game_id,
            phase: self.phase,
            play_order: self.play_order.clone(),
            dealer_index: self.dealer_index,
            current_turn_index: self.current_turn_index,
            hands_counts: self
                .hands
                .iter()
                .map(|(id, h)| (*id, h.len()))
                .collect(),
            bids: self.bids.clone(),
            spades_broken: self.spades_broken,
            current_trick: self.current_trick.clone(),
            completed_tricks_count: self.completed_tricks.len(),
            last_trick_winner_id: self.last_trick_winner_id,
            last_trick_winning_card: self.last_trick_winning_card,
            team_scores: self.team_scores,
            accumulated_bags: self.accumulated_bags,
            team_eligible_for_blind: self.team_eligible_for_blind,
            round_score_breakdown: self.round_score_breakdown,
            round_trick_counts: self.round_trick_counts,
            winner_team_id: self.winner_team_id,
            is_tie: self.is_tie,
            turn_started_at: self.turn_started_at,
        }
    }

    #[must_use]
    pub fn player_view(&self, user_id: UserId) -> SpadesPlayerState {
        SpadesPlayerState {
            public: self.public_view(),
            hand: self.hands.get(&user_id).cloned().unwrap_or_default(),
            local_ordering: rotate_to_seat(&self.play_order, user_id),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SpadesPublicState {
    pub game_id: GameId,
    pub phase: SpadesPhase,
    pub play_order: Vec<UserId>,
    pub dealer_index: usize,
    pub current_turn_index: usize,
    pub hands_counts: HashMap<UserId, usize>,
    pub bids: HashMap<UserId, Bid>,
    pub spades_broken: bool,
    pub current_trick: Trick,
    pub completed_tricks_count: usize,
    pub last_trick_winner_id: Option<UserId>,
    pub last_trick_winning_card: Option<Card>,
    pub team_scores: [i64; 2],
    pub accumulated_bags: [i64; 2],
    pub team_eligible_for_blind: [bool; 2],
    pub round_score_breakdown: Option<RoundScoreBreakdown>,
    pub round_trick_counts: Option<[u32; 2]>,
    pub winner_team_id: Option<u8>,
    pub is_tie: bool,
    pub turn_started_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SpadesPlayerState {
    #[serde(flatten)]
    pub public: SpadesPublicState,
    pub hand: Vec<Card>,
    pub local_ordering: Vec<UserId>,
}
