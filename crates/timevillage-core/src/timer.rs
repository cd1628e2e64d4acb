//! Single-session stopwatch
//!
//! The engine is a plain state machine: `Idle` or `Running`. Something
//! outside (the session ticker) calls [`TimerEngine::tick`] once per period;
//! each tick adds exactly one second regardless of wall-clock jitter.
//! [`TimerEngine::finish`] hands back the amount to commit to the ledger.

use crate::CategoryId;
use serde::{Deserialize, Serialize};

/// Whether the stopwatch is counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
}

/// Single-category stopwatch state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEngine {
    phase: TimerPhase,
    active_category: Option<CategoryId>,
    session_elapsed: u64,
}

/// Snapshot of the timer for live views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub running: bool,
    pub active_category: Option<CategoryId>,
    pub session_elapsed: u64,
}

impl TimerEngine {
    /// Create an idle timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Whether the timer is counting
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Category of the current (running or paused) session
    pub fn active_category(&self) -> Option<CategoryId> {
        self.active_category
    }

    /// Seconds counted in the current session
    pub fn session_elapsed(&self) -> u64 {
        self.session_elapsed
    }

    /// Start a fresh session for `category`
    ///
    /// No-op returning `false` when already running. The session counter is
    /// reset to zero; use [`resume`](Self::resume) to continue a paused one.
    pub fn start(&mut self, category: CategoryId) -> bool {
        if self.is_running() {
            return false;
        }
        self.phase = TimerPhase::Running;
        self.active_category = Some(category);
        self.session_elapsed = 0;
        true
    }

    /// Continue a paused session without resetting its counter
    ///
    /// Returns `false` when running already or when there is no paused session.
    pub fn resume(&mut self) -> bool {
        if self.is_running() || self.active_category.is_none() {
            return false;
        }
        self.phase = TimerPhase::Running;
        true
    }

    /// Stop counting; the elapsed seconds are kept for a later `finish`
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = TimerPhase::Idle;
        true
    }

    /// Count one second; ignored while idle
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.session_elapsed += 1;
        true
    }

    /// End the session and return the seconds to commit, if any
    ///
    /// Always leaves the timer idle with no active category and a zero
    /// counter. A second call returns `None`.
    pub fn finish(&mut self) -> Option<u64> {
        let elapsed = self.session_elapsed;
        self.phase = TimerPhase::Idle;
        self.active_category = None;
        self.session_elapsed = 0;
        (elapsed > 0).then_some(elapsed)
    }

    /// Snapshot for live views
    pub fn view(&self) -> TimerView {
        TimerView {
            running: self.is_running(),
            active_category: self.active_category,
            session_elapsed: self.session_elapsed,
        }
    }
}
