//! Runtime state shared between the main control line and the watchdog.
//!
//! Every field has one designated writer: `in_combat` belongs to the main
//! line, `recovery_requested` may be set by either side but is cleared only
//! by the main loop, counters are monotonic increments. Readers (the status
//! reporter) get eventually-consistent snapshots and never block a writer.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared counters and flags for one process lifetime.
#[derive(Debug, Default)]
pub struct RuntimeState {
    status: Mutex<String>,
    action: Mutex<String>,
    loops: AtomicU64,
    completed: AtomicU64,
    cinematics: AtomicU64,
    stuck_fixed: AtomicU64,
    recoveries: AtomicU64,
    in_combat: AtomicBool,
    recovery_requested: AtomicBool,
}

/// Point-in-time copy of the runtime state for display.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub status: String,
    pub action: String,
    pub loops: u64,
    pub completed: u64,
    pub cinematics: u64,
    pub stuck_fixed: u64,
    pub recoveries: u64,
    pub in_combat: bool,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self {
            status: Mutex::new("starting".to_string()),
            action: Mutex::new("waiting".to_string()),
            ..Default::default()
        }
    }

    pub fn set_status(&self, status: &str) {
        *self.status.lock().unwrap() = status.to_string();
    }

    pub fn set_action(&self, action: &str) {
        log::info!("{action}");
        *self.action.lock().unwrap() = action.to_string();
    }

    /// Enter the busy critical section; suppresses watchdog intervention.
    /// Main control line only.
    pub fn enter_combat(&self) {
        self.in_combat.store(true, Ordering::SeqCst);
    }

    /// Main control line only.
    pub fn leave_combat(&self) {
        self.in_combat.store(false, Ordering::SeqCst);
    }

    pub fn in_combat(&self) -> bool {
        self.in_combat.load(Ordering::SeqCst)
    }

    /// Ask the main line to re-synchronize. Either line may call this.
    pub fn request_recovery(&self) {
        self.recovery_requested.store(true, Ordering::SeqCst);
    }

    /// Consume a pending recovery request. Main loop only, at most once per
    /// outer iteration.
    pub fn take_recovery_request(&self) -> bool {
        self.recovery_requested.swap(false, Ordering::SeqCst)
    }

    pub fn recovery_pending(&self) -> bool {
        self.recovery_requested.load(Ordering::SeqCst)
    }

    pub fn add_loop(&self) {
        self.loops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_cinematic(&self) {
        self.cinematics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_stuck_fix(&self) {
        self.stuck_fixed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_recovery(&self) {
        self.recoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            status: self.status.lock().unwrap().clone(),
            action: self.action.lock().unwrap().clone(),
            loops: self.loops.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            cinematics: self.cinematics.load(Ordering::Relaxed),
            stuck_fixed: self.stuck_fixed.load(Ordering::Relaxed),
            recoveries: self.recoveries.load(Ordering::Relaxed),
            in_combat: self.in_combat(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_request_is_taken_once() {
        let state = RuntimeState::new();
        assert!(!state.take_recovery_request());

        state.request_recovery();
        assert!(state.recovery_pending());
        assert!(state.take_recovery_request());
        assert!(!state.take_recovery_request());
        assert!(!state.recovery_pending());
    }

    #[test]
    fn combat_flag_round_trip() {
        let state = RuntimeState::new();
        assert!(!state.in_combat());
        state.enter_combat();
        assert!(state.in_combat());
        state.leave_combat();
        assert!(!state.in_combat());
    }

    #[test]
    fn snapshot_reflects_counters() {
        let state = RuntimeState::new();
        state.add_loop();
        state.add_completed();
        state.add_completed();
        state.add_stuck_fix();
        state.set_status("farming");
        state.set_action("waiting for StartBattle");

        let snap = state.snapshot();
        assert_eq!(snap.loops, 1);
        assert_eq!(snap.completed, 2);
        assert_eq!(snap.stuck_fixed, 1);
        assert_eq!(snap.status, "farming");
        assert_eq!(snap.action, "waiting for StartBattle");
        assert!(!snap.in_combat);
    }
}
