use std::time::Duration;

use uuid::Uuid;

use crate::coords::{self, Point};
use crate::game::cables::Cable;
use crate::game::interaction::{DragState, GestureOutcome, InteractionHandler};
use crate::game::state::{
    ConfigError, Connection, FailFlash, GameConfig, GameEvent, GameState, RoundPhase, Session,
};
use crate::game::timers::{Scheduler, TimerHandle, TimerKind};
use crate::types::{Bank, TimeBand};

/// One play session: the round state machine, the drag handler and the timers
/// that drive them. The presentation layer talks only to this type.
pub struct Game {
    pub id: Uuid,
    session: Session,
    interaction: InteractionHandler,
    scheduler: Scheduler,
    countdown: Option<TimerHandle>,
    retry: Option<TimerHandle>,
    fail_flash: Option<TimerHandle>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let session = Session::new(config)?;
        let mut game = Self {
            id: Uuid::new_v4(),
            session,
            interaction: InteractionHandler::new(),
            scheduler: Scheduler::new(),
            countdown: None,
            retry: None,
            fail_flash: None,
        };
        game.rearm(TimerKind::Countdown);
        Ok(game)
    }

    /// Moves the clock forward by `elapsed`, firing every timer that falls due
    /// on the way, in deadline order.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some(handle) = self.scheduler.pop_due(until) {
            self.fire(handle);
        }
        self.scheduler.advance_clock(until);
    }

    pub fn on_gesture_start(&mut self, index: usize, position: Point) -> bool {
        self.interaction
            .gesture_start(&self.session, index, position)
    }

    pub fn on_gesture_move(&mut self, position: Point) {
        self.interaction.gesture_move(position);
    }

    pub fn on_hover_enter(&mut self, index: usize) {
        self.interaction.hover_enter(&self.session, index);
    }

    pub fn on_hover_leave(&mut self) {
        self.interaction.hover_leave();
    }

    pub fn on_gesture_end(&mut self) -> GestureOutcome {
        let outcome = self.interaction.gesture_end(&mut self.session);
        if let GestureOutcome::Mismatch { .. } = outcome {
            self.rearm(TimerKind::FailFlash);
        }
        if !matches!(outcome, GestureOutcome::Ignored | GestureOutcome::NoTarget) {
            self.after_transition();
        }
        outcome
    }

    fn fire(&mut self, handle: TimerHandle) {
        let slot = self.slot_mut(handle.kind());
        if *slot != Some(handle) {
            tracing::trace!(kind = %handle.kind(), "stale timer ignored");
            return;
        }
        *slot = None;

        match handle.kind() {
            TimerKind::Countdown => {
                self.session.tick();
                self.after_transition();
            }
            TimerKind::Retry => {
                if self.session.retry() {
                    self.interaction.reset();
                    self.after_transition();
                }
            }
            TimerKind::FailFlash => self.session.clear_fail_flash(),
        }
    }

    /// Brings the armed timers in line with the current phase.
    fn after_transition(&mut self) {
        match self.session.phase() {
            RoundPhase::Active => {
                self.cancel(TimerKind::Retry);
                if self.countdown.is_none() {
                    self.rearm(TimerKind::Countdown);
                }
            }
            RoundPhase::TimedOut | RoundPhase::Failed => {
                self.cancel(TimerKind::Countdown);
                self.interaction.reset();
                if self.retry.is_none() {
                    self.rearm(TimerKind::Retry);
                }
            }
            RoundPhase::Succeeded | RoundPhase::PermanentFailure => {
                self.cancel(TimerKind::Countdown);
                self.cancel(TimerKind::Retry);
                self.interaction.reset();
            }
        }
    }

    fn rearm(&mut self, kind: TimerKind) {
        self.cancel(kind);
        let handle = self.scheduler.arm(kind);
        *self.slot_mut(kind) = Some(handle);
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(handle) = self.slot_mut(kind).take() {
            self.scheduler.cancel(handle);
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::Countdown => &mut self.countdown,
            TimerKind::Retry => &mut self.retry,
            TimerKind::FailFlash => &mut self.fail_flash,
        }
    }

    pub fn is_timer_armed(&self, kind: TimerKind) -> bool {
        let slot = match kind {
            TimerKind::Countdown => self.countdown,
            TimerKind::Retry => self.retry,
            TimerKind::FailFlash => self.fail_flash,
        };
        slot.is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn config(&self) -> &GameConfig {
        self.session.config()
    }

    pub fn state(&self) -> &GameState {
        self.session.state()
    }

    pub fn phase(&self) -> RoundPhase {
        self.session.phase()
    }

    pub fn round(&self) -> u32 {
        self.session.round()
    }

    pub fn connections(&self) -> &[Connection] {
        self.session.connections()
    }

    pub fn left_cables(&self) -> &[Cable] {
        &self.session.cables().left
    }

    pub fn right_cables(&self) -> &[Cable] {
        &self.session.cables().right
    }

    pub fn drag_state(&self) -> &DragState {
        self.interaction.drag()
    }

    pub fn drag_over_target(&self) -> Option<usize> {
        self.interaction.drag_over_target()
    }

    pub fn fail_flash(&self) -> FailFlash {
        self.session.fail_flash()
    }

    pub fn lost_rounds(&self) -> u32 {
        self.session.lost_rounds()
    }

    pub fn permanent_failure(&self) -> bool {
        self.session.permanent_failure()
    }

    pub fn time_band(&self) -> TimeBand {
        self.session.time_band()
    }

    pub fn is_left_connected(&self, from: usize) -> bool {
        self.session.is_left_connected(from)
    }

    pub fn is_right_connected(&self, to: usize) -> bool {
        self.session.is_right_connected(to)
    }

    /// Right slot holding the same color as left slot `from`.
    pub fn partner_of(&self, from: usize) -> Option<usize> {
        self.session.cables().partner_of(from)
    }

    pub fn connector_position(&self, bank: Bank, index: usize) -> Option<Point> {
        coords::connector_position(bank, index, self.session.config().number_of_cables)
    }

    /// Connector of `bank` under `point`, if any.
    pub fn connector_at(&self, bank: Bank, point: Point, radius: f64) -> Option<usize> {
        coords::hit_test(bank, self.session.config().number_of_cables, point, radius)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }
}
