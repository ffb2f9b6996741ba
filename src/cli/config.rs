use std::path::PathBuf;

use crate::game::{ConfigError, GameConfig};

/// Command-line overrides shared by the binaries. Flags win over the config
/// file, which wins over the defaults.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// JSON file with game settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seconds per round
    #[arg(long)]
    pub time_per_round: Option<u32>,

    /// Number of cables per bank
    #[arg(long)]
    pub cables: Option<usize>,

    /// Failed drops allowed per round
    #[arg(long)]
    pub max_failed_attempts: Option<u32>,

    /// Lost rounds before the session locks
    #[arg(long)]
    pub max_lost_rounds: Option<u32>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ConfigArgs {
    pub fn resolve(&self) -> Result<GameConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };
        if let Some(time) = self.time_per_round {
            config.time_per_round = time;
        }
        if let Some(cables) = self.cables {
            config.number_of_cables = cables;
        }
        if let Some(attempts) = self.max_failed_attempts {
            config.max_failed_attempts = attempts;
        }
        if let Some(rounds) = self.max_lost_rounds {
            config.max_lost_rounds = rounds;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}
