//! Dominoes reducer: one pure function per action, plus `init` and the
//! timeout auto-action (spec §4.8, §4.9).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;

use super::board::{Board, Side};
use super::scoring::{score_round, RoundEnd};
use super::state::{DominoesPhase, DominoesState};
use super::tiles::{build_set, deal, Tile};
use crate::error::{CoreError, GameError};
use crate::game::GameAction;
use crate::ids::{GameId, UserId};
use crate::room::Room;
use crate::settings::DominoesSettings;

const HAND_SIZE: usize = 7;

/// Player holding the highest double (6-6 down to 0-0), falling back to
/// seat 0 when nobody was dealt a double.
fn find_starter(play_order: &[UserId], hands: &HashMap<UserId, Vec<Tile>>) -> UserId {
    let mut best: Option<(u8, UserId)> = None;
    for &user_id in play_order {
        if let Some(hand) = hands.get(&user_id) {
            for tile in hand.iter().filter(|t| t.is_double()) {
                if best.is_none_or(|(v, _)| tile.left > v) {
                    best = Some((tile.left, user_id));
                }
            }
        }
    }
    best.map_or_else(|| play_order[0], |(_, user_id)| user_id)
}

pub fn init(
    room: &Room,
    game_id: GameId,
    settings: &DominoesSettings,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<DominoesState, CoreError> {
    let play_order: Vec<UserId> = room
        .users
        .iter()
        .map(|u| u.id)
        .filter(|id| !room.is_spectator(*id))
        .collect();
    if play_order.len() != 4 {
        return Err(GameError::UnknownPlayer.into());
    }

    let (hand_list, boneyard) = deal(build_set(), 4, HAND_SIZE, rng);
    let hands: HashMap<UserId, Vec<Tile>> =
        play_order.iter().copied().zip(hand_list).collect();
    let starter = find_starter(&play_order, &hands);
    let current_turn_index = play_order.iter().position(|&u| u == starter).unwrap_or(0);

    let connected = play_order
        .iter()
        .map(|&u| (u, room.user(u).is_some_and(|usr| usr.connected)))
        .collect();

    Ok(DominoesState {
        game_id,
        room_id: room.id,
        settings: settings.clone(),
        play_order,
        hands,
        boneyard,
        board: Board::default(),
        current_turn_index,
        phase: DominoesPhase::Playing,
        consecutive_passes: 0,
        player_scores: HashMap::new(),
        round_winner_id: None,
        is_tie: false,
        last_round_pip_counts: None,
        turn_started_at: Some(now),
        connected,
        history: vec!["round_started".to_string()],
    })
}

pub fn reduce(
    state: &DominoesState,
    user_id: UserId,
    action: GameAction,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<DominoesState, CoreError> {
    match action {
        GameAction::PlaceTile { tile, side } => place_tile(state, user_id, tile, side, now),
        GameAction::Pass => pass(state, user_id, now),
        GameAction::ContinueAfterRoundSummary => {
            continue_after_round_summary(state, user_id, rng, now)
        }
        GameAction::PlaceBid { .. }
        | GameAction::PlayCard { .. }
        | GameAction::ContinueAfterTrickResult => Err(GameError::WrongPhase.into()),
    }
}

fn require_current_turn(state: &DominoesState, user_id: UserId) -> Result<(), CoreError> {
    if state.play_order.get(state.current_turn_index) != Some(&user_id) {
        return Err(GameError::OutOfTurn.into());
    }
    if !state.connected.get(&user_id).copied().unwrap_or(false) {
        return Err(GameError::Disconnected.into());
    }
    Ok(())
}

/// True if any tile in `hand` can legally be placed somewhere on `board`.
#[must_use]
pub fn has_legal_move(hand: &[Tile], board: &Board) -> bool {
    hand.iter().any(|&t| board.can_place_anywhere(t))
}

fn place_tile(
    state: &DominoesState,
    user_id: UserId,
    tile: Tile,
    side: Side,
    now: DateTime<Utc>,
) -> Result<DominoesState, CoreError> {
    if state.phase != DominoesPhase::Playing {
        return Err(GameError::WrongPhase.into());
    }
    require_current_turn(state, user_id)?;
    let hand = state.hands.get(&user_id).ok_or(GameError::UnknownPlayer)?;
    if !hand.contains(&tile) {
        return Err(GameError::TileNotInHand.into());
    }
    if !state.board.accepts(tile, side) {
        return Err(GameError::IllegalPlay("tile does not match the chosen end".into()).into());
    }

    let mut next = state.clone();
    next.board.place(tile, side)?;
    let hand = next.hands.get_mut(&user_id).expect("checked above");
    let pos = hand.iter().position(|&t| t == tile).expect("checked above");
    hand.remove(pos);
    next.consecutive_passes = 0;
    next.push_history(format!("place:{user_id}:{tile}"));

    if next.hands.get(&user_id).is_some_and(Vec::is_empty) {
        apply_round_end(&mut next, RoundEnd::GoOut(user_id));
    } else {
        next.current_turn_index = (next.current_turn_index + 1) % next.play_order.len();
        next.turn_started_at = Some(now);
    }

    Ok(next)
}

fn pass(state: &DominoesState, user_id: UserId, now: DateTime<Utc>) -> Result<DominoesState, CoreError> {
    if state.phase != DominoesPhase::Playing {
        return Err(GameError::WrongPhase.into());
    }
    require_current_turn(state, user_id)?;
    let hand = state.hands.get(&user_id).ok_or(GameError::UnknownPlayer)?;
    if has_legal_move(hand, &state.board) {
        return Err(GameError::IllegalPlay("a legal tile is held; may not pass".into()).into());
    }

    let mut next = state.clone();
    next.consecutive_passes += 1;
    next.push_history(format!("pass:{user_id}"));

    if next.consecutive_passes >= 4 {
        apply_round_end(&mut next, RoundEnd::Blocked);
    } else {
        next.current_turn_index = (next.current_turn_index + 1) % next.play_order.len();
        next.turn_started_at = Some(now);
    }

    Ok(next)
}

fn apply_round_end(state: &mut DominoesState, end: RoundEnd) {
    let (pip_counts, winner, is_tie, deltas) = score_round(state, end);
    for (user_id, delta) in deltas {
        *state.player_scores.entry(user_id).or_insert(0) += delta;
    }
    state.last_round_pip_counts = Some(pip_counts);
    state.round_winner_id = winner;
    state.is_tie = is_tie;

    let game_won = state
        .player_scores
        .values()
        .any(|&score| score >= state.settings.win_target);
    state.phase = if game_won {
        DominoesPhase::Finished
    } else {
        DominoesPhase::RoundSummary
    };
}

fn continue_after_round_summary(
    state: &DominoesState,
    user_id: UserId,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<DominoesState, CoreError> {
    if state.phase != DominoesPhase::RoundSummary {
        return Err(GameError::WrongPhase.into());
    }
    if !state.play_order.contains(&user_id) {
        return Err(GameError::UnknownPlayer.into());
    }

    let mut next = state.clone();
    let (hand_list, boneyard) = deal(build_set(), 4, HAND_SIZE, rng);
    next.hands = next.play_order.iter().copied().zip(hand_list).collect();
    next.boneyard = boneyard;
    next.board = Board::default();
    next.consecutive_passes = 0;
    next.round_winner_id = None;
    next.is_tie = false;
    next.last_round_pip_counts = None;
    let starter = find_starter(&next.play_order, &next.hands);
    next.current_turn_index = next.play_order.iter().position(|&u| u == starter).unwrap_or(0);
    next.phase = DominoesPhase::Playing;
    next.turn_started_at = Some(now);
    next.push_history("round_started");
    Ok(next)
}

/// The auto-action the turn timer dispatches on timeout (spec §4.9): a
/// pass when no legal tile is held; otherwise left unspecified.
#[must_use]
pub fn timeout_action(state: &DominoesState) -> Option<GameAction> {
    if state.phase != DominoesPhase::Playing {
        return None;
    }
    let user_id = *state.play_order.get(state.current_turn_index)?;
    let hand = state.hands.get(&user_id)?;
    if has_legal_move(hand, &state.board) {
        None
    } else {
        Some(GameAction::Pass)
    }
}

pub fn on_disconnect(state: &mut DominoesState, user_id: UserId) {
    state.connected.insert(user_id, false);
}

pub fn on_reconnect(state: &mut DominoesState, user_id: UserId) {
    state.connected.insert(user_id, true);
}

pub fn transfer_slot(state: &mut DominoesState, from: UserId, to: UserId) {
    if let Some(idx) = state.play_order.iter().position(|&u| u == from) {
        state.play_order[idx] = to;
    }
    if let Some(hand) = state.hands.remove(&from) {
        state.hands.insert(to, hand);
    }
    if let Some(score) = state.player_scores.remove(&from) {
        state.player_scores.insert(to, score);
    }
    if state.round_winner_id == Some(from) {
        state.round_winner_id = Some(to);
    }
    state.connected.remove(&from);
    state.connected.insert(to, true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_starter_picks_highest_double() {
        let users = [UserId::new(), UserId::new(), UserId::new(), UserId::new()];
        let mut hands = HashMap::new();
        hands.insert(users[0], vec![Tile::new(2, 2)]);
        hands.insert(users[1], vec![Tile::new(6, 6)]);
        hands.insert(users[2], vec![Tile::new(4, 4)]);
        hands.insert(users[3], vec![Tile::new(1, 3)]);
        assert_eq!(find_starter(&users, &hands), users[1]);
    }

    #[test]
    fn find_starter_falls_back_to_seat_zero_without_doubles() {
        let users = [UserId::new(), UserId::new(), UserId::new(), UserId::new()];
        let mut hands = HashMap::new();
        for &u in &users {
            hands.insert(u, vec![Tile::new(1, 2)]);
        }
        assert_eq!(find_starter(&users, &hands), users[0]);
    }
}
