//! Core logic of the story farmer: anchor vocabulary, configuration,
//! shared runtime state, the per-level-type engine, recovery, and the
//! watchdog. Everything that touches pixels or the OS sits behind the
//! [`Perception`] and [`Controls`] traits so the whole control flow is
//! testable with scripted fakes.

pub mod anchor;
pub mod config;
pub mod engine;
pub mod error;
pub mod poll;
pub mod recovery;
pub mod state;
pub mod watchdog;

pub use anchor::{Anchor, PRIORITY_TABLE, WATCHDOG_WHITELIST};
pub use config::{Config, SkipPosition};
pub use engine::{Engine, LevelKind, Timeouts};
pub use error::{FarmError, Result};
pub use state::{RuntimeState, StateSnapshot};
pub use watchdog::{CycleOutcome, Watchdog};

use std::time::Duration;

/// Absolute screen coordinate.
pub type Point = (i32, i32);

/// Screen-space rectangle of the target window's content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Eyes of the bot: classify freshly captured frames of the target window.
///
/// Every call samples a NEW frame; frames are never cached between calls.
/// Returned points are absolute screen coordinates.
pub trait Perception {
    /// Locate one anchor at the default confidence threshold.
    fn find(&mut self, anchor: Anchor) -> Option<Point>;

    /// Locate one anchor at an override threshold (stricter or looser than
    /// the default).
    fn find_with_threshold(&mut self, anchor: Anchor, threshold: f32) -> Option<Point>;

    /// Score all candidates against ONE captured frame and return the
    /// strict-highest scorer at or above the default threshold. Candidates
    /// must never be scored against different frames.
    fn classify_best(&mut self, candidates: &[Anchor]) -> Option<(Anchor, Point)>;

    /// Capture a frame, sleep `interval`, capture another, and return the
    /// summed absolute grayscale difference. `None` if either capture
    /// failed.
    fn stillness(&mut self, interval: Duration) -> Option<u64>;

    /// Current geometry of the target window, freshly queried. The window
    /// can move or resize at any time, so this is never cached.
    fn window_rect(&mut self) -> Option<WindowRect>;

    /// False once captures have failed often enough in a row that the
    /// target window is presumed gone.
    fn healthy(&self) -> bool {
        true
    }
}

/// Hands of the bot. Implementations block for the settle delay after
/// issuing input; failures are logged, not propagated, since a swallowed
/// click surfaces later as a NotFound on the next anchor.
pub trait Controls {
    /// Click at an absolute screen coordinate.
    fn click(&mut self, point: Point);

    /// Press the generic cancel/escape key.
    fn press_cancel(&mut self);
}
