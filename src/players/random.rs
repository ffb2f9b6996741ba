use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::game::Game;
use crate::players::base::{BasePlayer, Move, open_left_slots};

/// Drags an unconnected cable to any right slot.
#[derive(Clone)]
pub struct RandomPlayer;

impl BasePlayer for RandomPlayer {
    fn decide(&self, game: &Game, rng: &mut StdRng) -> Option<Move> {
        let from = *open_left_slots(game).choose(rng)?;
        let slots = game.right_cables().len();
        if slots == 0 {
            return None;
        }
        Some(Move {
            from,
            to: rng.gen_range(0..slots),
        })
    }
}
