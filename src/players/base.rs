use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::game::{Game, GestureOutcome};
use crate::types::Bank;

/// A drag from left slot `from` released over right slot `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    /// Replays the move as the pointer events a human would produce.
    pub fn perform(self, game: &mut Game) -> GestureOutcome {
        let start = game
            .connector_position(Bank::Left, self.from)
            .unwrap_or_default();
        let end = game
            .connector_position(Bank::Right, self.to)
            .unwrap_or_default();
        if !game.on_gesture_start(self.from, start) {
            return GestureOutcome::Ignored;
        }
        game.on_gesture_move(start.lerp(end, 0.5));
        game.on_gesture_move(end);
        game.on_hover_enter(self.to);
        game.on_gesture_end()
    }
}

pub trait BasePlayer {
    fn decide(&self, game: &Game, rng: &mut StdRng) -> Option<Move>;
}

pub(crate) fn open_left_slots(game: &Game) -> Vec<usize> {
    (0..game.left_cables().len())
        .filter(|from| !game.is_left_connected(*from))
        .collect()
}
