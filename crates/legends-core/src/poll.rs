//! The one bounded-wait primitive.
//!
//! There is no event-driven notification of screen changes in this domain;
//! every wait is a poll loop with a fixed inter-poll delay and a wall-clock
//! timeout check. All handlers go through these two functions instead of
//! hand-rolling their own loops.

use std::thread;
use std::time::{Duration, Instant};

/// Poll `f` every `interval` until it yields a value or `timeout` elapses.
///
/// `f` runs at least once, immediately. The effective bound is `timeout`
/// plus at most one interval.
pub fn poll_until<T>(
    timeout: Duration,
    interval: Duration,
    mut f: impl FnMut() -> Option<T>,
) -> Option<T> {
    let start = Instant::now();
    loop {
        if let Some(value) = f() {
            return Some(value);
        }
        if start.elapsed() >= timeout {
            return None;
        }
        thread::sleep(interval);
    }
}

/// Poll `f` every `interval` until it yields a value. Used by the setup
/// waits, where the watchdog is trusted to unwedge a stuck screen.
pub fn poll_forever<T>(interval: Duration, mut f: impl FnMut() -> Option<T>) -> T {
    loop {
        if let Some(value) = f() {
            return value;
        }
        thread::sleep(interval);
    }
}
