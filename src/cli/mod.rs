pub mod config;
pub mod players;
pub mod stats;
pub mod tui;

pub use config::ConfigArgs;
pub use players::{CLI_PLAYERS, CliPlayer, PlayerInstance, create_player, print_player_help};
pub use stats::{GameStats, StatisticsAccumulator};
pub use tui::TuiApp;
