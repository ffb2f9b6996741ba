use rand::rngs::StdRng;

use crate::game::Game;
use crate::players::{BasePlayer, MatchingPlayer, Move, RandomPlayer};

pub struct CliPlayer {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLI_PLAYERS: &[CliPlayer] = &[
    CliPlayer {
        code: "R",
        name: "RandomPlayer",
        description: "Drags an unconnected cable to a random socket.",
    },
    CliPlayer {
        code: "M",
        name: "MatchingPlayer",
        description: "Drags each cable to its matching socket. First param is the MISTAKE_RATE (default 0.1).",
    },
];

#[derive(Clone)]
pub enum PlayerInstance {
    Random(RandomPlayer),
    Matching(MatchingPlayer),
}

impl PlayerInstance {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerInstance::Random(_) => "Random",
            PlayerInstance::Matching(_) => "Matching",
        }
    }
}

impl BasePlayer for PlayerInstance {
    fn decide(&self, game: &Game, rng: &mut StdRng) -> Option<Move> {
        match self {
            PlayerInstance::Random(p) => p.decide(game, rng),
            PlayerInstance::Matching(p) => p.decide(game, rng),
        }
    }
}

pub fn create_player(code: &str, params: Vec<&str>) -> Option<PlayerInstance> {
    match code {
        "R" => Some(PlayerInstance::Random(RandomPlayer)),
        "M" => {
            let mistake_rate = match params.first() {
                Some(raw) => Some(raw.parse::<f64>().ok().filter(|rate| rate.is_finite())?),
                None => None,
            };
            Some(PlayerInstance::Matching(MatchingPlayer::new(mistake_rate)))
        }
        _ => None,
    }
}

pub fn print_player_help() {
    println!("Player Legend:");
    println!("{:<5} {:<25} {}", "CODE", "PLAYER", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    for player in CLI_PLAYERS {
        println!("{:<5} {:<25} {}", player.code, player.name, player.description);
    }
}
