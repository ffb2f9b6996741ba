use std::time::Duration;

use crate::game::{Game, GameEvent, LossReason};

#[derive(Debug, Default, Clone)]
pub struct GameStats {
    pub sessions: u32,
    pub sessions_won: u32,
    pub permanent_failures: u32,
    pub rounds_played: u32,
    pub rounds_won: u32,
    pub rounds_timed_out: u32,
    pub rounds_failed: u32,
    pub total_time_left_on_win: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::RoundStarted { .. } => self.rounds_played += 1,
                GameEvent::RoundWon { time_left, .. } => {
                    self.rounds_won += 1;
                    self.total_time_left_on_win += u64::from(*time_left);
                }
                GameEvent::RoundLost { reason, .. } => match reason {
                    LossReason::TimeUp => self.rounds_timed_out += 1,
                    LossReason::TooManyFailures => self.rounds_failed += 1,
                },
                _ => {}
            }
        }
    }

    pub fn record_session(&mut self, game: &Game, duration: Duration) {
        self.sessions += 1;
        self.total_duration += duration;
        if game.permanent_failure() {
            self.permanent_failures += 1;
        } else if game.phase() == crate::game::RoundPhase::Succeeded {
            self.sessions_won += 1;
        }
    }

    pub fn merge(&mut self, other: &GameStats) {
        self.sessions += other.sessions;
        self.sessions_won += other.sessions_won;
        self.permanent_failures += other.permanent_failures;
        self.rounds_played += other.rounds_played;
        self.rounds_won += other.rounds_won;
        self.rounds_timed_out += other.rounds_timed_out;
        self.rounds_failed += other.rounds_failed;
        self.total_time_left_on_win += other.total_time_left_on_win;
        self.total_duration += other.total_duration;
    }

    pub fn get_win_rate(&self) -> f64 {
        if self.sessions == 0 {
            return 0.0;
        }
        self.sessions_won as f64 / self.sessions as f64
    }

    pub fn get_avg_rounds(&self) -> f64 {
        if self.sessions == 0 {
            return 0.0;
        }
        self.rounds_played as f64 / self.sessions as f64
    }

    pub fn get_avg_time_left_on_win(&self) -> f64 {
        if self.rounds_won == 0 {
            return 0.0;
        }
        self.total_time_left_on_win as f64 / self.rounds_won as f64
    }

    pub fn get_avg_duration(&self) -> Duration {
        if self.sessions == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.sessions
    }
}

pub struct StatisticsAccumulator {
    pub stats: GameStats,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self {
            stats: GameStats::new(),
        }
    }

    pub fn step(&mut self, events: &[GameEvent]) {
        self.stats.record_events(events);
    }

    pub fn after(&mut self, game: &Game, duration: Duration) {
        self.stats.record_session(game, duration);
    }
}

impl Default for StatisticsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_round_outcomes() {
        let mut stats = GameStats::new();
        stats.record_events(&[
            GameEvent::RoundStarted { round: 1 },
            GameEvent::RoundLost {
                round: 1,
                reason: LossReason::TimeUp,
            },
            GameEvent::RoundStarted { round: 2 },
            GameEvent::RoundLost {
                round: 2,
                reason: LossReason::TooManyFailures,
            },
            GameEvent::RoundStarted { round: 3 },
            GameEvent::RoundWon {
                round: 3,
                time_left: 12,
            },
        ]);
        assert_eq!(stats.rounds_played, 3);
        assert_eq!(stats.rounds_timed_out, 1);
        assert_eq!(stats.rounds_failed, 1);
        assert_eq!(stats.rounds_won, 1);
        assert_eq!(stats.get_avg_time_left_on_win(), 12.0);
    }
}
