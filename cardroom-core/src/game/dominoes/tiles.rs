//! Double-six domino tiles.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rand_util::shuffle;

/// A tile's two pip values, stored with `left <= right` so equality and
/// hashing are orientation-independent. Orientation on the board is a
/// property of placement, not of the tile value itself.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Tile {
    pub left: u8,
    pub right: u8,
}

impl Tile {
    #[must_use]
    pub fn new(a: u8, b: u8) -> Self {
        if a <= b {
            Self { left: a, right: b }
        } else {
            Self { left: b, right: a }
        }
    }

    #[must_use]
    pub fn is_double(self) -> bool {
        self.left == self.right
    }

    #[must_use]
    pub fn pip_sum(self) -> u32 {
        u32::from(self.left) + u32::from(self.right)
    }

    #[must_use]
    pub fn has_pip(self, value: u8) -> bool {
        self.left == value || self.right == value
    }

    /// The pip on the opposite side from `value`, if `value` is one of
    /// this tile's pips.
    #[must_use]
    pub fn other_pip(self, value: u8) -> Option<u8> {
        if self.left == value {
            Some(self.right)
        } else if self.right == value {
            Some(self.left)
        } else {
            None
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}|{}]", self.left, self.right)
    }
}

/// Build the 28-tile double-six set.
#[must_use]
pub fn build_set() -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(28);
    for a in 0..=6u8 {
        for b in a..=6u8 {
            tiles.push(Tile::new(a, b));
        }
    }
    debug_assert_eq!(tiles.len(), 28);
    tiles
}

/// Shuffle and deal `hand_count` hands of `tiles_per_hand` tiles each; the
/// remainder stays as the boneyard.
#[must_use]
pub fn deal(mut tiles: Vec<Tile>, hand_count: usize, tiles_per_hand: usize, rng: &mut impl Rng) -> (Vec<Vec<Tile>>, Vec<Tile>) {
    shuffle(&mut tiles, rng);
    let mut hands = Vec::with_capacity(hand_count);
    let mut rest = tiles;
    for _ in 0..hand_count {
        let hand = rest.split_off(rest.len() - tiles_per_hand.min(rest.len()));
        hands.push(hand);
    }
    // `split_off` takes the tail; reverse so each hand holds a contiguous
    // draw in dealing order rather than the tail of what's left each time.
    hands.reverse();
    (hands, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_set_has_28_tiles_and_7_doubles() {
        let tiles = build_set();
        assert_eq!(tiles.len(), 28);
        assert_eq!(tiles.iter().filter(|t| t.is_double()).count(), 7);
    }

    #[test]
    fn deal_splits_into_equal_hands_and_leftover_boneyard() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let (hands, boneyard) = deal(build_set(), 4, 7, &mut rng);
        assert_eq!(hands.len(), 4);
        for hand in &hands {
            assert_eq!(hand.len(), 7);
        }
        assert_eq!(boneyard.len(), 0);
    }

    #[test]
    fn tile_normalizes_pip_order() {
        assert_eq!(Tile::new(5, 2), Tile::new(2, 5));
    }
}
