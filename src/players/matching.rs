use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::game::Game;
use crate::players::base::{BasePlayer, Move, open_left_slots};

const DEFAULT_MISTAKE_RATE: f64 = 0.1;

/// Knows the right partner for every cable but misplaces one now and then.
#[derive(Clone)]
pub struct MatchingPlayer {
    mistake_rate: f64,
}

impl MatchingPlayer {
    /// Non-finite rates fall back to the default; the rest is clamped to [0, 1].
    pub fn new(mistake_rate: Option<f64>) -> Self {
        Self {
            mistake_rate: mistake_rate
                .filter(|rate| rate.is_finite())
                .unwrap_or(DEFAULT_MISTAKE_RATE)
                .clamp(0.0, 1.0),
        }
    }

    pub fn mistake_rate(&self) -> f64 {
        self.mistake_rate
    }
}

impl BasePlayer for MatchingPlayer {
    fn decide(&self, game: &Game, rng: &mut StdRng) -> Option<Move> {
        let from = *open_left_slots(game).choose(rng)?;
        let partner = game.partner_of(from)?;
        let slots = game.right_cables().len();
        if slots > 1 && rng.gen_bool(self.mistake_rate) {
            let offset = rng.gen_range(1..slots);
            return Some(Move {
                from,
                to: (partner + offset) % slots,
            });
        }
        Some(Move { from, to: partner })
    }
}
