#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod cli;
pub mod coords;
pub mod game;
pub mod players;
pub mod types;

pub use coords::{BOARD_SIZE, Point};
pub use game::{Game, GameConfig, GameEvent, GameState, RoundPhase};
pub use types::{Bank, CableColor, TimeBand};
