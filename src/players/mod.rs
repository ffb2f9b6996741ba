pub mod base;
pub mod matching;
pub mod random;

pub use base::{BasePlayer, Move};
pub use matching::MatchingPlayer;
pub use random::RandomPlayer;
