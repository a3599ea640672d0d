//! Simulation clock and reference-counted pause.
//!
//! All gameplay timing (cooldowns, status durations, wave timers) runs on a
//! virtual millisecond clock advanced once per tick with the frame delta.
//! Pausing freezes the clock for every subsystem at once; there is no
//! per-timer pause bookkeeping to drift out of sync.

use arrayvec::ArrayVec;

/// Why the simulation is currently held paused.
///
/// Multiple holders can pause concurrently (a tutorial overlay on top of a
/// menu, a window blur during a skill choice); gameplay resumes only after
/// every holder releases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PauseReason {
    Tutorial,
    Menu,
    WindowBlur,
    SkillChoice,
    Manual,
}

const MAX_PAUSE_HOLDS: usize = 8;

/// Reference-counted pause latch.
///
/// Each `acquire` pushes a hold; `release` pops the matching hold. The
/// simulation is paused while any hold is outstanding. Releasing a reason
/// that holds nothing is a logged no-op rather than an underflow.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauseLatch {
    holds: ArrayVec<PauseReason, MAX_PAUSE_HOLDS>,
}

impl PauseLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        !self.holds.is_empty()
    }

    /// Add a pause hold for `reason`.
    ///
    /// The same reason may be held more than once (nested menus); every
    /// acquire needs a matching release.
    pub fn acquire(&mut self, reason: PauseReason) {
        if self.holds.is_full() {
            tracing::warn!(?reason, "pause hold stack full, dropping acquire");
            return;
        }
        self.holds.push(reason);
    }

    /// Release one hold for `reason`. Returns true if gameplay resumed.
    pub fn release(&mut self, reason: PauseReason) -> bool {
        match self.holds.iter().rposition(|r| *r == reason) {
            Some(idx) => {
                self.holds.remove(idx);
            }
            None => {
                tracing::warn!(?reason, "release without matching pause hold");
            }
        }
        self.holds.is_empty()
    }

    /// Drop every hold (scene teardown).
    pub fn reset(&mut self) {
        self.holds.clear();
    }

    pub fn holds(&self) -> impl Iterator<Item = PauseReason> + '_ {
        self.holds.iter().copied()
    }
}

/// Virtual millisecond clock.
///
/// `now()` only moves when `advance` is called with the simulation unpaused,
/// so timestamp-based cooldowns freeze atomically with everything else.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    now_ms: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn advance(&mut self, dt_ms: u64) {
        self.now_ms += dt_ms;
    }

    /// Whether a deadline recorded earlier has passed.
    pub fn elapsed(&self, deadline_ms: u64) -> bool {
        self.now_ms >= deadline_ms
    }
}
