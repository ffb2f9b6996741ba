use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
pub const RETRY_DELAY: Duration = Duration::from_millis(1500);
pub const FAIL_FLASH_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TimerKind {
    Countdown,
    Retry,
    FailFlash,
}

impl TimerKind {
    pub fn delay(self) -> Duration {
        match self {
            TimerKind::Countdown => COUNTDOWN_TICK,
            TimerKind::Retry => RETRY_DELAY,
            TimerKind::FailFlash => FAIL_FLASH_DURATION,
        }
    }
}

/// Identifies one armed timer. Handles are never reused, so a handle kept by
/// its owner can be compared against a fired one to detect staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    kind: TimerKind,
    deadline: Duration,
}

impl TimerHandle {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// One-shot timers over a virtual clock. Nothing fires on its own: the owner
/// advances the clock and pops due timers in deadline order.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<TimerHandle>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn arm(&mut self, kind: TimerKind) -> TimerHandle {
        self.arm_after(kind, kind.delay())
    }

    pub fn arm_after(&mut self, kind: TimerKind, delay: Duration) -> TimerHandle {
        let handle = TimerHandle {
            id: self.next_id,
            kind,
            deadline: self.now + delay,
        };
        self.next_id += 1;
        self.pending.push(handle);
        handle
    }

    /// Removes a pending timer. Returns false if it already fired or was canceled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|pending| pending.id != handle.id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|pending| pending.id == handle.id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pops the earliest timer due at or before `until` and moves the clock to
    /// its deadline. Ties fire in arming order.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerHandle> {
        let (position, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.deadline <= until)
            .min_by_key(|(_, pending)| (pending.deadline, pending.id))?;
        let handle = self.pending.remove(position);
        self.now = self.now.max(handle.deadline);
        Some(handle)
    }

    /// Moves the clock forward without firing anything. The clock never goes back.
    pub fn advance_clock(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
