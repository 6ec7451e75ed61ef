//! The two-ended domino chain (spec §4.8).

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, GameError};

use super::tiles::Tile;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct BoardEnd {
    pub value: u8,
}

/// One tile as placed on the board: `outward_pip` faces the open end it
/// sits closest to, `inward_pip` is the pip fused to its neighbor.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct PlacedTile {
    pub tile: Tile,
    pub outward_pip: u8,
    pub inward_pip: u8,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Board {
    pub chain: Vec<PlacedTile>,
    pub left_end: Option<BoardEnd>,
    pub right_end: Option<BoardEnd>,
}

impl Board {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Does `tile` have a pip matching the open end on `side`? Always true
    /// on an empty board (any tile may open play).
    #[must_use]
    pub fn accepts(&self, tile: Tile, side: Side) -> bool {
        if self.is_empty() {
            return true;
        }
        let end = match side {
            Side::Left => self.left_end,
            Side::Right => self.right_end,
        };
        end.is_some_and(|e| tile.has_pip(e.value))
    }

    #[must_use]
    pub fn can_place_anywhere(&self, tile: Tile) -> bool {
        self.is_empty() || self.accepts(tile, Side::Left) || self.accepts(tile, Side::Right)
    }

    /// Place `tile` on `side`, updating the chain and that end's open
    /// value. The matching pip becomes internal; the opposite pip becomes
    /// the new end value (spec §4.8).
    pub fn place(&mut self, tile: Tile, side: Side) -> Result<(), CoreError> {
        if self.is_empty() {
            self.chain.push(PlacedTile {
                tile,
                outward_pip: tile.right,
                inward_pip: tile.left,
            });
            self.left_end = Some(BoardEnd { value: tile.left });
            self.right_end = Some(BoardEnd { value: tile.right });
            return Ok(());
        }

        if !self.accepts(tile, side) {
            return Err(GameError::IllegalPlay("tile does not match the chosen end".into()).into());
        }

        let end_value = match side {
            Side::Left => self.left_end.expect("non-empty board has both ends").value,
            Side::Right => self.right_end.expect("non-empty board has both ends").value,
        };
        let new_end = tile
            .other_pip(end_value)
            .expect("accepts() already confirmed a matching pip");

        let placed = PlacedTile {
            tile,
            outward_pip: new_end,
            inward_pip: end_value,
        };
        match side {
            Side::Left => {
                self.chain.insert(0, placed);
                self.left_end = Some(BoardEnd { value: new_end });
            }
            Side::Right => {
                self.chain.push(placed);
                self.right_end = Some(BoardEnd { value: new_end });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tile_sets_both_ends() {
        let mut board = Board::default();
        board.place(Tile::new(3, 5), Side::Left).unwrap();
        assert_eq!(board.left_end, Some(BoardEnd { value: 3 }));
        assert_eq!(board.right_end, Some(BoardEnd { value: 5 }));
    }

    #[test]
    fn matching_pip_becomes_internal_and_opposite_becomes_new_end() {
        let mut board = Board::default();
        board.place(Tile::new(3, 5), Side::Right).unwrap();
        board.place(Tile::new(5, 6), Side::Right).unwrap();
        assert_eq!(board.right_end, Some(BoardEnd { value: 6 }));
        assert_eq!(board.left_end, Some(BoardEnd { value: 3 }));
    }

    #[test]
    fn rejects_non_matching_tile() {
        let mut board = Board::default();
        board.place(Tile::new(3, 5), Side::Left).unwrap();
        assert!(board.place(Tile::new(1, 2), Side::Right).is_err());
    }
}
