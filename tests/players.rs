use std::time::Duration;

use cable_match::cli::{StatisticsAccumulator, create_player};
use cable_match::game::{Game, GameConfig, RoundPhase};
use cable_match::players::{BasePlayer, MatchingPlayer, RandomPlayer};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn play_out<P: BasePlayer>(
    player: &P,
    config: GameConfig,
    think: Duration,
    stats: &mut StatisticsAccumulator,
) -> Game {
    let mut game = Game::new(config).unwrap();
    let mut rng = StdRng::seed_from_u64(17);
    while !game.phase().is_terminal() {
        if game.phase() == RoundPhase::Active {
            if let Some(mv) = player.decide(&game, &mut rng) {
                mv.perform(&mut game);
            }
        }
        game.advance(think);
        stats.step(&game.drain_events());
    }
    stats.after(&game, Duration::ZERO);
    game
}

#[test]
fn flawless_player_wins_the_first_round() {
    let mut stats = StatisticsAccumulator::new();
    let config = GameConfig {
        seed: Some(8),
        ..GameConfig::default()
    };
    let game = play_out(
        &MatchingPlayer::new(Some(0.0)),
        config,
        Duration::from_secs(1),
        &mut stats,
    );
    assert_eq!(game.phase(), RoundPhase::Succeeded);
    assert_eq!(game.round(), 1);
    assert_eq!(game.state().failed_attempts, 0);
    assert_eq!(game.state().time_left, 45 - 9);
    assert_eq!(stats.stats.rounds_won, 1);
    assert_eq!(stats.stats.sessions_won, 1);
}

#[test]
fn slow_player_gets_locked_out() {
    let mut stats = StatisticsAccumulator::new();
    let config = GameConfig {
        seed: Some(8),
        time_per_round: 5,
        ..GameConfig::default()
    };
    let game = play_out(
        &MatchingPlayer::new(Some(0.0)),
        config,
        Duration::from_secs(1),
        &mut stats,
    );
    assert_eq!(game.phase(), RoundPhase::PermanentFailure);
    assert_eq!(game.lost_rounds(), 3);
    assert_eq!(stats.stats.rounds_played, 3);
    assert_eq!(stats.stats.rounds_timed_out, 3);
    assert_eq!(stats.stats.permanent_failures, 1);
}

#[test]
fn random_sessions_always_terminate() {
    let mut stats = StatisticsAccumulator::new();
    for seed in 0..20 {
        let config = GameConfig {
            seed: Some(seed),
            number_of_cables: 3,
            ..GameConfig::default()
        };
        let game = play_out(&RandomPlayer, config, Duration::from_millis(700), &mut stats);
        assert!(game.phase().is_terminal());
        assert!(game.lost_rounds() <= 3);
        for connection in game.connections() {
            assert_eq!(
                game.left_cables()[connection.from].color,
                game.right_cables()[connection.to].color
            );
        }
    }
    assert_eq!(stats.stats.sessions, 20);
    assert_eq!(
        stats.stats.sessions_won + stats.stats.permanent_failures,
        20
    );
}

#[test]
fn cli_codes_build_players() {
    assert!(create_player("R", vec![]).is_some());
    let matching = create_player("M", vec!["0.5"]).unwrap();
    assert_eq!(matching.name(), "Matching");
    assert!(create_player("X", vec![]).is_none());
}

#[test]
fn non_finite_mistake_rates_never_reach_the_rng() {
    for raw in ["NaN", "inf", "-inf"] {
        assert!(create_player("M", vec![raw]).is_none(), "{raw} accepted");
    }
    assert!(create_player("M", vec!["often"]).is_none());

    let fallback = MatchingPlayer::new(Some(f64::NAN));
    assert_eq!(fallback.mistake_rate(), 0.1);
    assert_eq!(MatchingPlayer::new(Some(7.0)).mistake_rate(), 1.0);

    let game = Game::new(GameConfig {
        seed: Some(3),
        ..GameConfig::default()
    })
    .unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        assert!(fallback.decide(&game, &mut rng).is_some());
    }
}
