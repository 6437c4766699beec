//! Staleness watchdog running on its own thread.
//!
//! Every interval it compares two frames of the target window. A screen
//! that has barely changed means the main line is wedged on something it
//! cannot see; the watchdog then either clicks the most likely unblocking
//! control itself or asks the main line to run recovery. It never runs
//! recovery inline and never touches the busy flag.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::anchor::{Anchor, PRIORITY_TABLE, WATCHDOG_WHITELIST};
use crate::state::RuntimeState;
use crate::{Controls, Perception};

/// Summed grayscale difference below which two frames count as "the same
/// screen". Calibrated against a 1280x720 emulator window, where idle
/// animations alone score well above this.
pub const STUCK_DIFF_THRESHOLD: u64 = 50_000;

/// What one watchdog cycle did; returned for observability and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Battle in progress; long still stretches are normal there.
    SkippedCombat,
    /// A capture failed; no staleness verdict possible.
    SkippedCapture,
    /// A continue prompt was visible and got clicked.
    ClickedPrompt,
    /// No whitelisted screen recognized; recovery requested.
    UnknownScreen,
    /// Screen stale; clicked the highest-priority visible control.
    Corrective(Anchor),
    /// Screen stale with nothing clickable; recovery requested.
    RequestedRecovery,
    /// Screen moving normally.
    Idle,
}

/// Independent observer with its own perception and controls. Sharing the
/// main line's would serialize every capture behind a lock.
pub struct Watchdog<P: Perception, C: Controls> {
    eyes: P,
    hands: C,
    state: Arc<RuntimeState>,
    interval: Duration,
    stuck_threshold: u64,
}

impl<P: Perception, C: Controls> Watchdog<P, C> {
    pub fn new(eyes: P, hands: C, state: Arc<RuntimeState>, interval: Duration) -> Self {
        Self {
            eyes,
            hands,
            state,
            interval,
            stuck_threshold: STUCK_DIFF_THRESHOLD,
        }
    }

    pub fn with_stuck_threshold(mut self, threshold: u64) -> Self {
        self.stuck_threshold = threshold;
        self
    }

    /// One observation cycle. The stillness measurement itself spans the
    /// watchdog interval.
    pub fn cycle(&mut self) -> CycleOutcome {
        let diff = self.eyes.stillness(self.interval);

        // Checked after the measurement so a battle that started mid-span
        // is not misread as a stuck screen.
        if self.state.in_combat() {
            return CycleOutcome::SkippedCombat;
        }

        let Some(diff) = diff else {
            log::debug!("watchdog capture failed, skipping cycle");
            return CycleOutcome::SkippedCapture;
        };

        // A lingering continue prompt is the most common wedge; clear it
        // regardless of how much the screen is moving behind it.
        if let Some(point) = self.eyes.find(Anchor::Tap) {
            log::info!("watchdog: clearing a continue prompt");
            self.hands.click(point);
            self.state.add_stuck_fix();
            return CycleOutcome::ClickedPrompt;
        }

        if self.eyes.classify_best(WATCHDOG_WHITELIST).is_none() {
            log::warn!("watchdog: unrecognized screen, requesting recovery");
            self.state.request_recovery();
            self.state.add_stuck_fix();
            return CycleOutcome::UnknownScreen;
        }

        if diff < self.stuck_threshold {
            log::warn!("watchdog: screen stale (diff {diff})");
            for &(anchor, priority) in PRIORITY_TABLE {
                if let Some(point) = self.eyes.find(anchor) {
                    log::info!("watchdog: corrective click on {anchor} (priority {priority})");
                    self.hands.click(point);
                    self.state.add_stuck_fix();
                    return CycleOutcome::Corrective(anchor);
                }
            }
            log::warn!("watchdog: nothing clickable, requesting recovery");
            self.state.request_recovery();
            return CycleOutcome::RequestedRecovery;
        }

        CycleOutcome::Idle
    }

    /// Loop forever. A short grace period lets the main line get past the
    /// first screens before staleness judgments start.
    pub fn run(&mut self) {
        log::info!("watchdog started (interval {:?})", self.interval);
        thread::sleep(Duration::from_secs(5));
        loop {
            self.cycle();
        }
    }
}
