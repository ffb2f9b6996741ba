use std::fs;
use std::path::{Path, PathBuf};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::Display;

use crate::types::{CableColor, DEFAULT_PALETTE, TimeBand};

use super::cables::{CableAssignment, generate_cables};

pub const MIN_CABLES: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds on the clock at the start of each round.
    pub time_per_round: u32,
    pub number_of_cables: usize,
    pub max_failed_attempts: u32,
    /// Losses after which the session fails for good.
    pub max_lost_rounds: u32,
    pub cable_colors: Vec<CableColor>,
    /// Seed for cable shuffling. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_per_round: 45,
            number_of_cables: 10,
            max_failed_attempts: 3,
            max_lost_rounds: 3,
            cable_colors: DEFAULT_PALETTE.clone(),
            seed: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("number of cables must be at least {min}, got {0}", min = MIN_CABLES)]
    TooFewCables(usize),
    #[error("{requested} cables requested but the palette only has {available} colors")]
    PaletteTooShort { requested: usize, available: usize },
    #[error("color {0} appears more than once in the palette")]
    DuplicateColor(CableColor),
    #[error("color {0} is not a #rrggbb hex value")]
    InvalidColor(CableColor),
    #[error("time per round must be positive")]
    ZeroTime,
    #[error("max failed attempts must be positive")]
    ZeroFailedAttempts,
    #[error("max lost rounds must be positive")]
    ZeroLostRounds,
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GameConfig {
    /// Reads a JSON config. Missing fields fall back to the defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.number_of_cables < MIN_CABLES {
            return Err(ConfigError::TooFewCables(self.number_of_cables));
        }
        if self.number_of_cables > self.cable_colors.len() {
            return Err(ConfigError::PaletteTooShort {
                requested: self.number_of_cables,
                available: self.cable_colors.len(),
            });
        }
        if self.time_per_round == 0 {
            return Err(ConfigError::ZeroTime);
        }
        if self.max_failed_attempts == 0 {
            return Err(ConfigError::ZeroFailedAttempts);
        }
        if self.max_lost_rounds == 0 {
            return Err(ConfigError::ZeroLostRounds);
        }
        // Compared by value so `#F00`, `#f00` and `#ff0000` count as one color.
        let mut seen = Vec::with_capacity(self.cable_colors.len());
        for color in &self.cable_colors {
            let rgb = color
                .rgb()
                .ok_or_else(|| ConfigError::InvalidColor(color.clone()))?;
            if seen.contains(&rgb) {
                return Err(ConfigError::DuplicateColor(color.clone()));
            }
            seen.push(rgb);
        }
        Ok(())
    }

    /// Seed for the `session_idx`-th of a batch of sessions.
    pub fn session_seed(&self, session_idx: u32) -> u64 {
        self.seed.unwrap_or(42).wrapping_add(u64::from(session_idx))
    }
}

/// The authoritative per-round state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub time_left: u32,
    pub is_active: bool,
    pub failed_attempts: u32,
}

impl GameState {
    fn fresh(time_per_round: u32) -> Self {
        Self {
            time_left: time_per_round,
            is_active: true,
            failed_attempts: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
}

pub type Connections = SmallVec<[Connection; 10]>;

/// Marker for the most recent rejected match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailFlash {
    pub from: Option<usize>,
    pub to: Option<usize>,
}

impl FailFlash {
    pub fn is_set(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    Active,
    Succeeded,
    TimedOut,
    Failed,
    PermanentFailure,
}

impl RoundPhase {
    pub fn is_loss(self) -> bool {
        matches!(self, RoundPhase::TimedOut | RoundPhase::Failed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RoundPhase::Succeeded | RoundPhase::PermanentFailure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LossReason {
    TimeUp,
    TooManyFailures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted {
        round: u32,
    },
    Tick {
        time_left: u32,
    },
    Connected {
        from: usize,
        to: usize,
        superseded: usize,
    },
    Mismatch {
        from: usize,
        to: usize,
        failed_attempts: u32,
    },
    FailFlashCleared,
    RoundWon {
        round: u32,
        time_left: u32,
    },
    RoundLost {
        round: u32,
        reason: LossReason,
    },
    RetryScheduled {
        lost_rounds: u32,
    },
    PermanentFailure {
        lost_rounds: u32,
    },
}

/// Round and session state of one play session.
///
/// Transitions run synchronously on discrete events (`tick`, a committed or
/// rejected match, a retry). Arming and canceling timers is left to the owner,
/// which inspects [`Session::phase`] after each call.
#[derive(Debug, Clone)]
pub struct Session {
    config: GameConfig,
    cables: CableAssignment,
    connections: Connections,
    state: GameState,
    phase: RoundPhase,
    lost_rounds: u32,
    permanent_failure: bool,
    fail_flash: FailFlash,
    /// 1-based number of the current round.
    round: u32,
    events: Vec<GameEvent>,
    rng: StdRng,
}

impl Session {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut session = Self {
            state: GameState::fresh(config.time_per_round),
            config,
            cables: CableAssignment::default(),
            connections: Connections::new(),
            phase: RoundPhase::Active,
            lost_rounds: 0,
            permanent_failure: false,
            fail_flash: FailFlash::default(),
            round: 0,
            events: Vec::new(),
            rng,
        };
        session.start_round();
        Ok(session)
    }

    /// New cables, no connections, full clock.
    pub fn start_round(&mut self) {
        self.cables = generate_cables(
            &self.config.cable_colors,
            self.config.number_of_cables,
            &mut self.rng,
        );
        self.connections.clear();
        self.state = GameState::fresh(self.config.time_per_round);
        self.phase = RoundPhase::Active;
        self.round += 1;
        tracing::info!(
            round = self.round,
            lost_rounds = self.lost_rounds,
            "round started"
        );
        self.events.push(GameEvent::RoundStarted { round: self.round });
    }

    /// Applies a pending retry: counts the lost round and starts the next one.
    /// Ignored unless the current round ended in a non-permanent loss.
    pub fn retry(&mut self) -> bool {
        if !self.phase.is_loss() || self.permanent_failure {
            return false;
        }
        self.lost_rounds += 1;
        self.start_round();
        true
    }

    /// One countdown second.
    pub fn tick(&mut self) -> RoundPhase {
        if self.phase != RoundPhase::Active || self.state.time_left == 0 {
            return self.phase;
        }
        self.state.time_left -= 1;
        tracing::debug!(time_left = self.state.time_left, "tick");
        self.events.push(GameEvent::Tick {
            time_left: self.state.time_left,
        });
        self.evaluate()
    }

    /// Adds `from -> to`, dropping any connection sharing an endpoint.
    /// Refused when inactive or when the colors differ.
    pub fn commit_connection(&mut self, from: usize, to: usize) -> bool {
        if self.phase != RoundPhase::Active || !self.cables.colors_match(from, to) {
            return false;
        }
        let before = self.connections.len();
        self.connections
            .retain(|conn| conn.from != from && conn.to != to);
        let superseded = before - self.connections.len();
        self.connections.push(Connection { from, to });
        tracing::debug!(from, to, superseded, "connection committed");
        self.events.push(GameEvent::Connected {
            from,
            to,
            superseded,
        });
        self.evaluate();
        true
    }

    /// Counts a rejected match and raises the fail flash.
    pub fn register_mismatch(&mut self, from: usize, to: usize) {
        if self.phase != RoundPhase::Active {
            return;
        }
        self.state.failed_attempts += 1;
        self.fail_flash = FailFlash {
            from: Some(from),
            to: Some(to),
        };
        tracing::debug!(
            from,
            to,
            failed_attempts = self.state.failed_attempts,
            "mismatch"
        );
        self.events.push(GameEvent::Mismatch {
            from,
            to,
            failed_attempts: self.state.failed_attempts,
        });
        self.evaluate();
    }

    pub fn clear_fail_flash(&mut self) {
        if self.fail_flash.is_set() {
            self.fail_flash = FailFlash::default();
            self.events.push(GameEvent::FailFlashCleared);
        }
    }

    /// Checks the exit conditions of the `Active` phase and performs at most
    /// one transition.
    fn evaluate(&mut self) -> RoundPhase {
        if self.phase != RoundPhase::Active {
            return self.phase;
        }
        if self.connections.len() == self.config.number_of_cables {
            self.state.is_active = false;
            self.phase = RoundPhase::Succeeded;
            tracing::info!(
                round = self.round,
                time_left = self.state.time_left,
                "round won"
            );
            self.events.push(GameEvent::RoundWon {
                round: self.round,
                time_left: self.state.time_left,
            });
        } else if self.state.time_left == 0 {
            self.end_with_loss(RoundPhase::TimedOut, LossReason::TimeUp);
        } else if self.state.failed_attempts >= self.config.max_failed_attempts {
            self.end_with_loss(RoundPhase::Failed, LossReason::TooManyFailures);
        }
        self.phase
    }

    fn end_with_loss(&mut self, phase: RoundPhase, reason: LossReason) {
        self.state.is_active = false;
        self.phase = phase;
        tracing::info!(round = self.round, %reason, "round lost");
        self.events.push(GameEvent::RoundLost {
            round: self.round,
            reason,
        });
        // This loss is the N-th one when lost_rounds + 1 reaches the limit.
        if self.lost_rounds + 1 >= self.config.max_lost_rounds {
            self.lost_rounds += 1;
            self.permanent_failure = true;
            self.phase = RoundPhase::PermanentFailure;
            tracing::info!(lost_rounds = self.lost_rounds, "permanent failure");
            self.events.push(GameEvent::PermanentFailure {
                lost_rounds: self.lost_rounds,
            });
        } else {
            self.events.push(GameEvent::RetryScheduled {
                lost_rounds: self.lost_rounds + 1,
            });
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn cables(&self) -> &CableAssignment {
        &self.cables
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Losses so far. Never decreases.
    pub fn lost_rounds(&self) -> u32 {
        self.lost_rounds
    }

    pub fn permanent_failure(&self) -> bool {
        self.permanent_failure
    }

    pub fn fail_flash(&self) -> FailFlash {
        self.fail_flash
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn time_band(&self) -> TimeBand {
        TimeBand::from_fraction(self.state.time_left, self.config.time_per_round)
    }

    pub fn is_complete(&self) -> bool {
        self.connections.len() == self.config.number_of_cables
    }

    pub fn is_left_connected(&self, from: usize) -> bool {
        self.connections.iter().any(|conn| conn.from == from)
    }

    pub fn is_right_connected(&self, to: usize) -> bool {
        self.connections.iter().any(|conn| conn.to == to)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(5),
            number_of_cables: 4,
            ..GameConfig::default()
        }
    }

    #[test]
    fn rejects_invalid_configs() {
        let too_few = GameConfig {
            number_of_cables: 2,
            ..config()
        };
        assert!(matches!(too_few.validate(), Err(ConfigError::TooFewCables(2))));

        let too_many = GameConfig {
            number_of_cables: 11,
            ..config()
        };
        assert!(matches!(
            too_many.validate(),
            Err(ConfigError::PaletteTooShort {
                requested: 11,
                available: 10
            })
        ));

        let mut duplicate = config();
        duplicate.cable_colors[3] = duplicate.cable_colors[0].clone();
        assert!(matches!(
            duplicate.validate(),
            Err(ConfigError::DuplicateColor(_))
        ));

        let mut same_hex_other_case = config();
        same_hex_other_case.cable_colors[0] = CableColor::from("#ef4444");
        same_hex_other_case.cable_colors[1] = CableColor::from("#EF4444");
        assert!(matches!(
            same_hex_other_case.validate(),
            Err(ConfigError::DuplicateColor(color)) if color.as_str() == "#EF4444"
        ));

        let mut short_and_long = config();
        short_and_long.cable_colors[2] = CableColor::from("#f00");
        short_and_long.cable_colors[5] = CableColor::from("#ff0000");
        assert!(matches!(
            short_and_long.validate(),
            Err(ConfigError::DuplicateColor(color)) if color.as_str() == "#ff0000"
        ));

        let mut bad_color = config();
        bad_color.cable_colors[1] = CableColor::from("red");
        assert!(matches!(
            bad_color.validate(),
            Err(ConfigError::InvalidColor(_))
        ));

        let no_time = GameConfig {
            time_per_round: 0,
            ..config()
        };
        assert!(matches!(no_time.validate(), Err(ConfigError::ZeroTime)));
        assert!(Session::new(no_time).is_err());

        let no_attempts = GameConfig {
            max_failed_attempts: 0,
            ..config()
        };
        assert!(matches!(
            no_attempts.validate(),
            Err(ConfigError::ZeroFailedAttempts)
        ));

        let no_lost_rounds = GameConfig {
            max_lost_rounds: 0,
            ..config()
        };
        assert!(matches!(
            no_lost_rounds.validate(),
            Err(ConfigError::ZeroLostRounds)
        ));
    }

    #[test]
    fn session_seeds_wrap_at_the_top_of_the_range() {
        let pinned = GameConfig {
            seed: Some(u64::MAX - 1),
            ..config()
        };
        assert_eq!(pinned.session_seed(0), u64::MAX - 1);
        assert_eq!(pinned.session_seed(1), u64::MAX);
        assert_eq!(pinned.session_seed(2), 0);
        assert_eq!(config().session_seed(3), 8);
        assert_eq!(GameConfig::default().session_seed(1), 43);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{"time_per_round": 20, "seed": 9}"#).unwrap();
        assert_eq!(config.time_per_round, 20);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.number_of_cables, 10);
        assert_eq!(config.cable_colors.len(), 10);
        assert!(GameConfig::from_json_str("{ nope").is_err());
    }

    #[test]
    fn new_session_starts_first_round() {
        let mut session = Session::new(config()).unwrap();
        assert_eq!(session.round(), 1);
        assert_eq!(session.phase(), RoundPhase::Active);
        assert_eq!(session.cables().len(), 4);
        assert_eq!(
            *session.state(),
            GameState {
                time_left: 45,
                is_active: true,
                failed_attempts: 0
            }
        );
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::RoundStarted { round: 1 }]
        );
    }

    #[test]
    fn commit_refuses_mismatched_colors() {
        let mut session = Session::new(config()).unwrap();
        let partner = session.cables().partner_of(0).unwrap();
        let wrong = (partner + 1) % 4;
        assert!(!session.commit_connection(0, wrong));
        assert!(session.connections().is_empty());
        assert!(session.commit_connection(0, partner));
        assert_eq!(session.connections().len(), 1);
    }

    #[test]
    fn tick_is_ignored_outside_active() {
        let mut session = Session::new(config()).unwrap();
        for _ in 0..3 {
            session.register_mismatch(0, 0);
        }
        assert_eq!(session.phase(), RoundPhase::Failed);
        let time_left = session.state().time_left;
        session.tick();
        assert_eq!(session.state().time_left, time_left);
        session.register_mismatch(0, 0);
        assert_eq!(session.state().failed_attempts, 3);
    }

    #[test]
    fn retry_only_after_a_loss() {
        let mut session = Session::new(config()).unwrap();
        assert!(!session.retry());
        for _ in 0..45 {
            session.tick();
        }
        assert_eq!(session.phase(), RoundPhase::TimedOut);
        assert!(!session.state().is_active);
        assert!(session.retry());
        assert_eq!(session.lost_rounds(), 1);
        assert_eq!(session.round(), 2);
        assert_eq!(session.state().time_left, 45);
    }

    #[test]
    fn lost_rounds_never_reset_until_lockout() {
        let mut session = Session::new(GameConfig {
            time_per_round: 2,
            ..config()
        })
        .unwrap();
        let mut seen = Vec::new();
        while !session.permanent_failure() {
            session.tick();
            session.retry();
            seen.push(session.lost_rounds());
        }
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(session.lost_rounds(), 3);
        assert_eq!(session.phase(), RoundPhase::PermanentFailure);
        assert!(!session.retry());
        assert_eq!(session.round(), 3);
        assert!(session.connections().is_empty());
    }
}
