//! Round scoring (spec §4.8 `calculateRoundScores`).

use std::collections::HashMap;

use crate::ids::UserId;

use super::state::DominoesState;

pub enum RoundEnd {
    GoOut(UserId),
    Blocked,
}

/// Score a just-ended round. Returns each player's pip count, the round
/// winner (`None` on a tied blocked round), whether it was a tie, and the
/// score delta to add to `player_scores`.
#[must_use]
pub fn score_round(
    state: &DominoesState,
    end: RoundEnd,
) -> (HashMap<UserId, u32>, Option<UserId>, bool, HashMap<UserId, i64>) {
    let pip_counts: HashMap<UserId, u32> = state
        .hands
        .iter()
        .map(|(&id, hand)| (id, hand.iter().map(|t| t.pip_sum()).sum()))
        .collect();

    let mut deltas: HashMap<UserId, i64> = state.play_order.iter().map(|&u| (u, 0)).collect();

    match end {
        RoundEnd::GoOut(winner) => {
            let total: u32 = pip_counts
                .iter()
                .filter(|(&id, _)| id != winner)
                .map(|(_, &pips)| pips)
                .sum();
            deltas.insert(winner, i64::from(total));
            (pip_counts, Some(winner), false, deltas)
        }
        RoundEnd::Blocked => {
            let min_pips = pip_counts.values().copied().min().unwrap_or(0);
            let lowest: Vec<UserId> = pip_counts
                .iter()
                .filter(|(_, &pips)| pips == min_pips)
                .map(|(&id, _)| id)
                .collect();

            if lowest.len() != 1 {
                return (pip_counts, None, true, deltas);
            }

            let winner = lowest[0];
            let total: i64 = pip_counts
                .iter()
                .filter(|(&id, _)| id != winner)
                .map(|(_, &pips)| i64::from(pips) - i64::from(min_pips))
                .sum();
            deltas.insert(winner, total);
            (pip_counts, Some(winner), false, deltas)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::dominoes::board::Board;
    use crate::game::dominoes::state::DominoesPhase;
    use crate::game::dominoes::tiles::Tile;
    use crate::settings::DominoesSettings;

    fn base_state(users: [UserId; 4]) -> DominoesState {
        DominoesState {
            game_id: crate::ids::GameId::new(),
            room_id: crate::ids::RoomId::new(),
            settings: DominoesSettings::default(),
            play_order: users.to_vec(),
            hands: HashMap::new(),
            boneyard: Vec::new(),
            board: Board::default(),
            current_turn_index: 0,
            phase: DominoesPhase::Playing,
            consecutive_passes: 0,
            player_scores: users.iter().map(|&u| (u, 0)).collect(),
            round_winner_id: None,
            is_tie: false,
            last_round_pip_counts: None,
            turn_started_at: None,
            connected: users.iter().map(|&u| (u, true)).collect(),
            history: Vec::new(),
        }
    }

    #[test]
    fn go_out_winner_scores_sum_of_opponents_pips() {
        let users = [UserId::new(), UserId::new(), UserId::new(), UserId::new()];
        let mut state = base_state(users);
        state.hands.insert(users[0], Vec::new());
        state.hands.insert(users[1], vec![Tile::new(3, 4)]);
        state.hands.insert(users[2], vec![Tile::new(5, 5)]);
        state.hands.insert(users[3], vec![Tile::new(6, 6)]);

        let (_, winner, is_tie, deltas) = score_round(&state, RoundEnd::GoOut(users[0]));
        assert_eq!(winner, Some(users[0]));
        assert!(!is_tie);
        assert_eq!(deltas[&users[0]], 7 + 10 + 12);
    }

    #[test]
    fn blocked_tie_for_lowest_scores_nobody() {
        let users = [UserId::new(), UserId::new(), UserId::new(), UserId::new()];
        let mut state = base_state(users);
        state.hands.insert(users[0], vec![Tile::new(3, 3)]);
        state.hands.insert(users[1], vec![Tile::new(3, 3)]);
        state.hands.insert(users[2], vec![Tile::new(5, 5)]);
        state.hands.insert(users[3], vec![Tile::new(6, 0), Tile::new(0, 0)]);

        let (_, winner, is_tie, deltas) = score_round(&state, RoundEnd::Blocked);
        assert_eq!(winner, None);
        assert!(is_tie);
        assert!(deltas.values().all(|&d| d == 0));
    }

    #[test]
    fn blocked_single_lowest_earns_difference() {
        let users = [UserId::new(), UserId::new(), UserId::new(), UserId::new()];
        let mut state = base_state(users);
        state.hands.insert(users[0], vec![Tile::new(1, 1)]);
        state.hands.insert(users[1], vec![Tile::new(3, 3)]);
        state.hands.insert(users[2], vec![Tile::new(5, 5)]);
        state.hands.insert(users[3], vec![Tile::new(6, 1)]);

        let (_, winner, is_tie, deltas) = score_round(&state, RoundEnd::Blocked);
        assert_eq!(winner, Some(users[0]));
        assert!(!is_tie);
        assert_eq!(deltas[&users[0]], (6 - 2) + (10 - 2) + (7 - 2));
    }
}
