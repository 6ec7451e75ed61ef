//! Settings schema, validation, and the per-game discriminated settings
//! union (spec §9 "Settings as tagged config").

pub mod dominoes;
pub mod schema;
pub mod spades;

pub use dominoes::DominoesSettings;
pub use spades::SpadesSettings;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::game::GameType;

/// A validated settings value for one game type. `PartialGameSettings`
/// (an arbitrary JSON map keyed by game type) only ever exists at the
/// transport boundary; it must pass through here before reaching a
/// reducer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameSettings {
    Spades(SpadesSettings),
    Dominoes(DominoesSettings),
}

impl GameSettings {
    #[must_use]
    pub fn default_for(game_type: GameType) -> Self {
        match game_type {
            GameType::Spades => Self::Spades(SpadesSettings::default()),
            GameType::Dominoes => Self::Dominoes(DominoesSettings::default()),
        }
    }

    /// Validate a raw per-game-type settings blob. An unknown/mismatched
    /// game type's raw data passes through unchanged per spec §4.2.
    #[must_use]
    pub fn validate(game_type: GameType, raw: &Map<String, Value>) -> Self {
        match game_type {
            GameType::Spades => Self::Spades(SpadesSettings::from_partial(raw)),
            GameType::Dominoes => Self::Dominoes(DominoesSettings::from_partial(raw)),
        }
    }

    #[must_use]
    pub fn game_type(&self) -> GameType {
        match self {
            Self::Spades(_) => GameType::Spades,
            Self::Dominoes(_) => GameType::Dominoes,
        }
    }
}

/// Room-level settings, independent of the chosen game: capacity and
/// visibility. Distinct from `gameSettings`, which is per-game-type and
/// remembered across game-type switches (spec §3 Room data model).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomSettings {
    pub max_players: Option<usize>,
    pub is_private: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_players: Some(4),
            is_private: false,
        }
    }
}
