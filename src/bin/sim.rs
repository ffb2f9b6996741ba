use std::time::{Duration, Instant};

use cable_match::cli::players::PlayerInstance;
use cable_match::cli::{ConfigArgs, GameStats, StatisticsAccumulator, create_player, print_player_help};
use cable_match::game::{Game, GameConfig, RoundPhase};
use cable_match::players::BasePlayer;
use clap::Parser;
use itertools::Itertools;
use rand::SeedableRng;
use rand::rngs::StdRng;

const PLAYER_SEED_SALT: u64 = 0x5EED_CAB1E;

#[derive(Debug, Parser, Clone)]
#[command(name = "cable-sim")]
#[command(about = "Cable Match Simulator - Play sessions with automated players")]
struct Args {
    /// Number of sessions to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Player code, with ':'-separated params (e.g., M:0.2 for a 20% mistake rate)
    #[arg(long, default_value = "M")]
    player: String,

    /// Simulated milliseconds the player spends on each drag
    #[arg(long, default_value_t = 1500)]
    think_ms: u64,

    #[command(flatten)]
    config: ConfigArgs,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,

    /// Silence console output
    #[arg(long)]
    quiet: bool,

    /// Number of worker threads for parallel execution
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let args = Args::parse();

    if args.help_players {
        print_player_help();
        return;
    }

    let parts: Vec<&str> = args.player.split(':').collect();
    let player = match create_player(parts[0], parts[1..].to_vec()) {
        Some(player) => player,
        None => {
            eprintln!("Error: Unknown player code or bad params '{}'", args.player);
            eprintln!("Use --help-players to see available codes");
            std::process::exit(1);
        }
    };

    let config = args.config.resolve().unwrap_or_else(|err| {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    });

    let mut stats = StatisticsAccumulator::new();
    if args.workers > 1 {
        run_parallel_simulations(&args, &player, &config, &mut stats);
    } else {
        run_sequential_simulations(&args, &player, &config, &mut stats);
    }

    if !args.quiet {
        print_summary(&stats, &player);
    }
}

/// Plays one session to its end: either every cable connected or locked out.
fn play_session(
    config: &GameConfig,
    player: &PlayerInstance,
    think: Duration,
    seed: u64,
    stats: &mut StatisticsAccumulator,
) -> Game {
    let config = GameConfig {
        seed: Some(seed),
        ..config.clone()
    };
    let mut game = match Game::new(config) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };
    let mut rng = StdRng::seed_from_u64(seed ^ PLAYER_SEED_SALT);

    let start = Instant::now();
    while !game.phase().is_terminal() {
        if game.phase() == RoundPhase::Active {
            if let Some(mv) = player.decide(&game, &mut rng) {
                mv.perform(&mut game);
            }
        }
        game.advance(think);
        stats.step(&game.drain_events());
    }
    stats.after(&game, start.elapsed());
    game
}

fn run_sequential_simulations(
    args: &Args,
    player: &PlayerInstance,
    config: &GameConfig,
    stats: &mut StatisticsAccumulator,
) {
    let think = Duration::from_millis(args.think_ms.max(1));
    for session_idx in 0..args.num {
        let game = play_session(config, player, think, config.session_seed(session_idx), stats);

        if !args.quiet {
            let last_n = 10;
            if session_idx < last_n || session_idx >= args.num.saturating_sub(last_n) {
                let outcome = if game.permanent_failure() {
                    "LOCKED"
                } else {
                    "WON"
                };
                println!(
                    "Session {:>4}: Outcome={:>6}, Rounds={:>2}, Lost={:>2}, TimeLeft={:>3}s, SimTime={:?}",
                    session_idx + 1,
                    outcome,
                    game.round(),
                    game.lost_rounds(),
                    game.state().time_left,
                    game.now()
                );
            } else if (session_idx + 1) % 100 == 0 {
                print!(".");
                use std::io::Write;
                let _ = std::io::stdout().flush();
            }
        }
    }
}

fn run_parallel_simulations(
    args: &Args,
    player: &PlayerInstance,
    config: &GameConfig,
    stats: &mut StatisticsAccumulator,
) {
    use std::thread;

    let think = Duration::from_millis(args.think_ms.max(1));
    let sessions_per_worker = args.num as usize / args.workers;
    let remainder = args.num as usize % args.workers;

    let mut handles = Vec::new();
    for worker_id in 0..args.workers {
        let player = player.clone();
        let config = config.clone();
        let num_sessions = if worker_id < remainder {
            sessions_per_worker + 1
        } else {
            sessions_per_worker
        };

        let handle = thread::spawn(move || {
            let mut local_stats = StatisticsAccumulator::new();
            let start_idx = worker_id * sessions_per_worker + worker_id.min(remainder);
            for local_idx in 0..num_sessions {
                let seed = config.session_seed((start_idx + local_idx) as u32);
                play_session(&config, &player, think, seed, &mut local_stats);
            }
            local_stats.stats
        });
        handles.push(handle);
    }

    for handle in handles {
        match handle.join() {
            Ok(worker_stats) => stats.stats.merge(&worker_stats),
            Err(_) => eprintln!("Error: a simulation worker panicked"),
        }
    }
}

fn print_summary(accumulator: &StatisticsAccumulator, player: &PlayerInstance) {
    let stats: &GameStats = &accumulator.stats;
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(80));

    println!("\nPlayer: {}", player.name());
    println!(
        "{:<12} {:<10} {:<10} {:<12} {:<12}",
        "Sessions", "Won", "Locked", "Win Rate", "Avg Rounds"
    );
    println!("{}", "-".repeat(60));
    println!(
        "{:<12} {:<10} {:<10} {:<11.1}% {:<12.2}",
        stats.sessions,
        stats.sessions_won,
        stats.permanent_failures,
        stats.get_win_rate() * 100.0,
        stats.get_avg_rounds()
    );

    let breakdown = [
        ("won", stats.rounds_won),
        ("timed out", stats.rounds_timed_out),
        ("too many mistakes", stats.rounds_failed),
    ]
    .iter()
    .map(|(label, count)| format!("{count} {label}"))
    .join(", ");

    println!("\nRound Summary:");
    println!("  Total Rounds: {}", stats.rounds_played);
    println!("  Outcomes: {}", breakdown);
    println!(
        "  Avg Time Left On Win: {:.2}s",
        stats.get_avg_time_left_on_win()
    );
    println!("  Avg Wall Time Per Session: {:.2?}", stats.get_avg_duration());
}
