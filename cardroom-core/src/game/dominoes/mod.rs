//! Dominoes: four-player double-six blocking game (spec §4.8).

pub mod board;
pub mod reducer;
pub mod scoring;
pub mod state;
pub mod tiles;
