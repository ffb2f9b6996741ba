use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use cable_match::cli::{ConfigArgs, TuiApp};
use cable_match::game::{Game, RoundPhase};
use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(name = "cable-play")]
#[command(about = "Connect the cables before the clock runs out")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    /// Write a debug log of the session to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        match File::create(path) {
            Ok(file) => tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_max_level(tracing::Level::DEBUG)
                .init(),
            Err(err) => {
                eprintln!("Error: cannot create log file {}: {}", path.display(), err);
                std::process::exit(1);
            }
        }
    }

    let config = args.config.resolve().unwrap_or_else(|err| {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    });

    let game = Game::new(config).unwrap_or_else(|err| {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    });
    tracing::info!(id = %game.id, "session started");

    let mut app = TuiApp::new(game);
    if let Err(err) = app.run() {
        eprintln!("Error: terminal failure: {}", err);
        std::process::exit(1);
    }

    let game = app.game();
    println!("{}", "=".repeat(80));
    match game.phase() {
        RoundPhase::Succeeded => println!("All cables connected in round {}.", game.round()),
        RoundPhase::PermanentFailure => {
            println!("Locked out after {} lost rounds.", game.lost_rounds())
        }
        _ => println!("Quit during round {}.", game.round()),
    }
    println!("{}", "=".repeat(80));
}
