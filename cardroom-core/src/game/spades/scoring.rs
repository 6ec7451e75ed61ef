//! Round scoring (spec §4.7).

use super::state::{Bid, BidKind, RoundScoreBreakdown, SpadesState, TeamRoundBreakdown};

/// Score a just-completed round. Returns the breakdown plus the
/// post-penalty accumulated-bags figure for each team; the caller folds
/// `round_score` into `team_scores` and replaces `accumulated_bags`.
#[must_use]
pub fn score_round(state: &SpadesState) -> (RoundScoreBreakdown, [i64; 2]) {
    let mut tricks_won = [0u32; 2];
    for trick in &state.completed_tricks {
        if let Some(team) = state.team_of(trick.winner_id) {
            tricks_won[team] += 1;
        }
    }

    let mut team_bid = [0i64; 2];
    let mut has_blind = [false; 2];
    let mut nil_bonus = [0i64; 2];
    let mut nil_penalty = [0i64; 2];
    let mut blind_nil_bonus = [0i64; 2];
    let mut blind_nil_penalty = [0i64; 2];

    for (&user_id, &bid) in &state.bids {
        let Some(team) = state.team_of(user_id) else {
            continue;
        };
        let player_tricks = state
            .completed_tricks
            .iter()
            .filter(|t| t.winner_id == user_id)
            .count() as u32;

        match bid.kind() {
            BidKind::Nil => {
                if player_tricks == 0 {
                    nil_bonus[team] += 100;
                } else {
                    nil_penalty[team] += 100;
                }
            }
            BidKind::BlindNil => {
                if player_tricks == 0 {
                    blind_nil_bonus[team] += 200;
                } else {
                    blind_nil_penalty[team] += 200;
                }
            }
            BidKind::Blind => {
                has_blind[team] = true;
                team_bid[team] += bid.amount;
            }
            BidKind::Normal => {
                team_bid[team] += bid.amount;
            }
        }
    }

    let mut breakdowns = [TeamRoundBreakdown::default(); 2];
    let mut new_accumulated = state.accumulated_bags;

    for team in 0..2 {
        let bid = team_bid[team];
        let mut base_points = 0i64;
        let mut bag_points = 0i64;
        let mut blind_bonus = 0i64;
        let mut blind_penalty = 0i64;
        let mut bags_this_round = 0i64;

        if bid > 0 {
            if tricks_won[team] as i64 >= bid {
                base_points = bid * 10;
                if has_blind[team] {
                    blind_bonus = bid * 10;
                }
                bags_this_round = tricks_won[team] as i64 - bid;
                bag_points = bags_this_round;
            } else {
                base_points = -bid * 10;
                if has_blind[team] {
                    blind_penalty = bid * 10;
                }
            }
        }

        let cumulative_bags = state.accumulated_bags[team] + bags_this_round;
        let mut bag_penalty = 0i64;
        let mut remaining_bags = cumulative_bags;
        if cumulative_bags >= 10 {
            bag_penalty = state.settings.bags_penalty.abs();
            remaining_bags = cumulative_bags % 10;
        }
        new_accumulated[team] = remaining_bags;

        let round_score = base_points + bag_points + nil_bonus[team] - nil_penalty[team]
            + blind_bonus
            - blind_penalty
            + blind_nil_bonus[team]
            - blind_nil_penalty[team]
            - bag_penalty;

        breakdowns[team] = TeamRoundBreakdown {
            team_bid: bid,
            tricks_won: tricks_won[team],
            base_points,
            bag_points,
            bag_penalty,
            nil_bonus: nil_bonus[team],
            nil_penalty: nil_penalty[team],
            blind_bonus,
            blind_penalty,
            blind_nil_bonus: blind_nil_bonus[team],
            blind_nil_penalty: blind_nil_penalty[team],
            round_score,
        };
    }

    (RoundScoreBreakdown { teams: breakdowns }, new_accumulated)
}

/// Recompute blind eligibility for the next round: a team is eligible iff
/// it trails the highest-scoring team by at least 100 points.
#[must_use]
pub fn recompute_blind_eligibility(team_scores: [i64; 2]) -> [bool; 2] {
    let max_score = team_scores[0].max(team_scores[1]);
    [
        max_score - team_scores[0] >= 100,
        max_score - team_scores[1] >= 100,
    ]
}
