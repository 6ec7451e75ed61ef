//! Spades reducer: one pure function per action, plus `init` and the
//! timeout auto-action (spec §4.6, §4.9).

use chrono::{DateTime, Utc};
use rand::Rng;

use super::scoring::{recompute_blind_eligibility, score_round};
use super::state::{Bid, BidKind, SpadesPhase, SpadesState, Trick};
use crate::error::{CoreError, GameError, RoomError};
use crate::game::cards::{build_deck, card_beats, deal, sort_hand, Card, Suit};
use crate::game::GameAction;
use crate::ids::GameId;
use crate::ids::UserId;
use crate::room::Room;
use crate::settings::SpadesSettings;

pub fn init(
    room: &Room,
    game_id: GameId,
    settings: &SpadesSettings,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<SpadesState, CoreError> {
    let teams = room
        .teams
        .as_ref()
        .filter(|t| t.len() == 2 && t.iter().all(|team| team.len() == 2))
        .ok_or(RoomError::IncompleteTeams)?;

    let mut play_order = Vec::with_capacity(4);
    for seat in 0..2 {
        for team in teams {
            let user = team.get(seat).copied().flatten().ok_or(RoomError::IncompleteTeams)?;
            play_order.push(user);
        }
    }

    let dealer_index = rng.random_range(0..4);
    let deck = build_deck(settings.jokers_enabled);
    let mut hands = deal(deck, 4, rng);
    for hand in &mut hands {
        sort_hand(hand, settings);
    }

    let connected = play_order
        .iter()
        .map(|&u| (u, room.user(u).is_some_and(|usr| usr.connected)))
        .collect();

    let hands_map = play_order.iter().copied().zip(hands).collect();

    Ok(SpadesState {
        game_id,
        room_id: room.id,
        settings: settings.clone(),
        play_order,
        hands: hands_map,
        dealer_index,
        current_turn_index: dealer_index,
        phase: SpadesPhase::Bidding,
        bids: Default::default(),
        spades_broken: false,
        current_trick: Trick::default(),
        completed_tricks: Vec::new(),
        last_trick_winner_id: None,
        last_trick_winning_card: None,
        team_scores: [0, 0],
        accumulated_bags: [0, 0],
        team_eligible_for_blind: [false, false],
        round_score_breakdown: None,
        round_trick_counts: None,
        winner_team_id: None,
        is_tie: false,
        turn_started_at: Some(now),
        connected,
        history: vec!["round_started".to_string()],
    })
}

pub fn reduce(
    state: &SpadesState,
    user_id: UserId,
    action: GameAction,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<SpadesState, CoreError> {
    match action {
        GameAction::PlaceBid { amount, blind } => place_bid(state, user_id, amount, blind, now),
        GameAction::PlayCard { card } => play_card(state, user_id, card, now),
        GameAction::ContinueAfterTrickResult => continue_after_trick_result(state, user_id, now),
        GameAction::ContinueAfterRoundSummary => {
            continue_after_round_summary(state, user_id, rng, now)
        }
        GameAction::PlaceTile { .. } | GameAction::Pass => Err(GameError::WrongPhase.into()),
    }
}

fn require_current_turn(state: &SpadesState, user_id: UserId) -> Result<(), CoreError> {
    if state.play_order.get(state.current_turn_index) != Some(&user_id) {
        return Err(GameError::OutOfTurn.into());
    }
    if !state.connected.get(&user_id).copied().unwrap_or(false) {
        return Err(GameError::Disconnected.into());
    }
    Ok(())
}

fn place_bid(
    state: &SpadesState,
    user_id: UserId,
    amount: i64,
    blind: bool,
    now: DateTime<Utc>,
) -> Result<SpadesState, CoreError> {
    if state.phase != SpadesPhase::Bidding {
        return Err(GameError::WrongPhase.into());
    }
    require_current_turn(state, user_id)?;
    if state.bids.contains_key(&user_id) {
        return Err(GameError::AlreadyActed.into());
    }
    let team = state
        .team_of(user_id)
        .ok_or(GameError::UnknownPlayer)?;

    let bid = Bid { amount, blind };
    match bid.kind() {
        BidKind::Normal => {
            if !(1..=13).contains(&amount) {
                return Err(GameError::IllegalBid("normal bid must be 1..=13".into()).into());
            }
        }
        BidKind::Nil => {
            if !state.settings.allow_nil {
                return Err(GameError::IllegalBid("nil bidding is disabled".into()).into());
            }
        }
        BidKind::Blind => {
            if amount < 4 {
                return Err(GameError::IllegalBid("blind bid must be at least 4".into()).into());
            }
            if !state.settings.blind_bid_enabled {
                return Err(GameError::IllegalBid("blind bidding is disabled".into()).into());
            }
            if !state.team_eligible_for_blind[team] {
                return Err(GameError::IllegalBid("team is not eligible to blind bid".into()).into());
            }
        }
        BidKind::BlindNil => {
            if !(state.settings.blind_nil_enabled && state.settings.allow_nil) {
                return Err(GameError::IllegalBid("blind nil is disabled".into()).into());
            }
            if !state.team_eligible_for_blind[team] {
                return Err(GameError::IllegalBid("team is not eligible to blind bid".into()).into());
            }
        }
    }

    let mut next = state.clone();
    next.bids.insert(user_id, bid);
    next.current_turn_index = (next.current_turn_index + 1) % next.play_order.len();
    if next.bids.len() == 4 {
        next.phase = SpadesPhase::Playing;
        next.turn_started_at = Some(now);
    } else {
        next.turn_started_at = Some(now);
    }
    next.push_history(format!("bid:{user_id}:{amount}:{blind}"));
    Ok(next)
}

/// True if `card` is a legal play for `hand` given the trick so far.
#[must_use]
pub fn can_play_card(hand: &[Card], trick: &Trick, spades_broken: bool, card: Card) -> bool {
    if !hand.contains(&card) {
        return false;
    }
    match trick.lead_suit {
        None => {
            if card.suit == Suit::Spades && !spades_broken {
                hand.iter().all(|c| c.suit == Suit::Spades)
            } else {
                true
            }
        }
        Some(led) => {
            if card.suit == led {
                true
            } else {
                !hand.iter().any(|c| c.suit == led)
            }
        }
    }
}

fn play_card(
    state: &SpadesState,
    user_id: UserId,
    card: Card,
    now: DateTime<Utc>,
) -> Result<SpadesState, CoreError> {
    if state.phase != SpadesPhase::Playing {
        return Err(GameError::WrongPhase.into());
    }
    require_current_turn(state, user_id)?;
    let hand = state.hands.get(&user_id).ok_or(GameError::UnknownPlayer)?;
    if !hand.contains(&card) {
        return Err(GameError::CardNotInHand.into());
    }
    if !can_play_card(hand, &state.current_trick, state.spades_broken, card) {
        return Err(GameError::IllegalPlay("card does not follow suit or breaks spades early".into()).into());
    }

    let mut next = state.clone();
    {
        let hand = next.hands.get_mut(&user_id).expect("checked above");
        let pos = hand.iter().position(|&c| c == card).expect("checked above");
        hand.remove(pos);
    }
    if next.current_trick.plays.is_empty() {
        next.current_trick.lead_suit = Some(card.suit);
    }
    next.current_trick.plays.push((user_id, card));
    if card.suit == Suit::Spades {
        next.spades_broken = true;
    }
    next.push_history(format!("play:{user_id}:{card}"));

    if next.current_trick.plays.len() == 4 {
        let led = next.current_trick.lead_suit.expect("set on first play");
        let mut winner = next.current_trick.plays[0];
        for &(uid, c) in &next.current_trick.plays[1..] {
            if card_beats(c, winner.1, led, &next.settings) {
                winner = (uid, c);
            }
        }
        next.completed_tricks.push(super::state::CompletedTrick {
            plays: next.current_trick.plays.clone(),
            winner_id: winner.0,
        });
        next.last_trick_winner_id = Some(winner.0);
        next.last_trick_winning_card = Some(winner.1);
        next.current_trick = Trick::default();

        if next.hands.values().all(Vec::is_empty) {
            finish_round(&mut next);
        } else {
            next.phase = SpadesPhase::TrickResult;
        }
    } else {
        next.current_turn_index = (next.current_turn_index + 1) % next.play_order.len();
        next.turn_started_at = Some(now);
    }

    Ok(next)
}

fn finish_round(state: &mut SpadesState) {
    let (breakdown, new_bags) = score_round(state);
    for team in 0..2 {
        state.team_scores[team] += breakdown.teams[team].round_score;
    }
    state.accumulated_bags = new_bags;
    let mut counts = [0u32; 2];
    for trick in &state.completed_tricks {
        if let Some(t) = state.team_of(trick.winner_id) {
            counts[t] += 1;
        }
    }
    state.round_score_breakdown = Some(breakdown);
    state.round_trick_counts = Some(counts);

    let meets_target: Vec<usize> = (0..2)
        .filter(|&t| state.team_scores[t] >= state.settings.win_target)
        .collect();

    match meets_target.as_slice() {
        [] => {
            state.phase = SpadesPhase::RoundSummary;
        }
        [single] => {
            state.phase = SpadesPhase::Finished;
            state.winner_team_id = Some(*single as u8);
            state.is_tie = false;
        }
        _ => {
            state.phase = SpadesPhase::Finished;
            if state.team_scores[0] == state.team_scores[1] {
                state.winner_team_id = None;
                state.is_tie = true;
            } else {
                let winner = if state.team_scores[0] > state.team_scores[1] { 0 } else { 1 };
                state.winner_team_id = Some(winner as u8);
                state.is_tie = false;
            }
        }
    }
}

fn continue_after_trick_result(
    state: &SpadesState,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<SpadesState, CoreError> {
    if state.phase != SpadesPhase::TrickResult {
        return Err(GameError::WrongPhase.into());
    }
    if !state.is_member_seat(user_id) {
        return Err(GameError::UnknownPlayer.into());
    }
    let mut next = state.clone();
    let winner = next.last_trick_winner_id.ok_or(GameError::WrongPhase)?;
    next.current_turn_index = next
        .play_order
        .iter()
        .position(|&u| u == winner)
        .ok_or(GameError::UnknownPlayer)?;
    next.current_trick = Trick::default();
    next.turn_started_at = Some(now);
    next.phase = SpadesPhase::Playing;
    Ok(next)
}

fn continue_after_round_summary(
    state: &SpadesState,
    user_id: UserId,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<SpadesState, CoreError> {
    if state.phase != SpadesPhase::RoundSummary {
        return Err(GameError::WrongPhase.into());
    }
    if !state.is_member_seat(user_id) {
        return Err(GameError::UnknownPlayer.into());
    }

    let mut next = state.clone();
    next.dealer_index = (next.dealer_index + 1) % next.play_order.len();
    let deck = build_deck(next.settings.jokers_enabled);
    let mut hands = deal(deck, 4, rng);
    for hand in &mut hands {
        sort_hand(hand, &next.settings);
    }
    next.hands = next.play_order.iter().copied().zip(hands).collect();
    next.bids.clear();
    next.spades_broken = false;
    next.current_trick = Trick::default();
    next.completed_tricks.clear();
    next.last_trick_winner_id = None;
    next.last_trick_winning_card = None;
    next.round_score_breakdown = None;
    next.round_trick_counts = None;
    next.team_eligible_for_blind = recompute_blind_eligibility(next.team_scores);
    next.current_turn_index = next.dealer_index;
    next.phase = SpadesPhase::Bidding;
    next.turn_started_at = Some(now);
    next.push_history("round_started");
    Ok(next)
}

/// The auto-action the turn timer dispatches on timeout (spec §4.9).
#[must_use]
pub fn timeout_action(state: &SpadesState) -> Option<GameAction> {
    match state.phase {
        SpadesPhase::Bidding => Some(GameAction::PlaceBid {
            amount: if state.settings.allow_nil { 0 } else { 1 },
            blind: false,
        }),
        SpadesPhase::Playing => {
            let user_id = *state.play_order.get(state.current_turn_index)?;
            let hand = state.hands.get(&user_id)?;
            hand.iter()
                .copied()
                .find(|&c| can_play_card(hand, &state.current_trick, state.spades_broken, c))
                .map(|card| GameAction::PlayCard { card })
        }
        SpadesPhase::TrickResult | SpadesPhase::RoundSummary | SpadesPhase::Finished => None,
    }
}

pub fn on_disconnect(state: &mut SpadesState, user_id: UserId) {
    state.connected.insert(user_id, false);
}

pub fn on_reconnect(state: &mut SpadesState, user_id: UserId) {
    state.connected.insert(user_id, true);
}

pub fn transfer_slot(state: &mut SpadesState, from: UserId, to: UserId) {
    if let Some(idx) = state.play_order.iter().position(|&u| u == from) {
        state.play_order[idx] = to;
    }
    if let Some(hand) = state.hands.remove(&from) {
        state.hands.insert(to, hand);
    }
    if let Some(bid) = state.bids.remove(&from) {
        state.bids.insert(to, bid);
    }
    for (uid, _) in &mut state.current_trick.plays {
        if *uid == from {
            *uid = to;
        }
    }
    for trick in &mut state.completed_tricks {
        for (uid, _) in &mut trick.plays {
            if *uid == from {
                *uid = to;
            }
        }
        if trick.winner_id == from {
            trick.winner_id = to;
        }
    }
    if state.last_trick_winner_id == Some(from) {
        state.last_trick_winner_id = Some(to);
    }
    state.connected.remove(&from);
    state.connected.insert(to, true);
}

impl SpadesState {
    fn is_member_seat(&self, user_id: UserId) -> bool {
        self.play_order.contains(&user_id)
    }
}
