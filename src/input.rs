//! Synthetic mouse and keyboard input.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use legends_core::{Controls, Point};

/// Gap between moving the cursor and pressing the button; some emulators
/// drop clicks that land in the same instant as the move.
const MOVE_CLICK_GAP: Duration = Duration::from_millis(60);

/// Live [`Controls`] backed by OS-level synthetic input.
///
/// Input errors are logged and swallowed: a lost click shows up soon enough
/// as an anchor that never appears, and recovery handles it from there.
pub struct EnigoControls {
    enigo: Enigo,
    settle: Duration,
}

impl EnigoControls {
    pub fn new(settle: Duration) -> anyhow::Result<Self> {
        let enigo = Enigo::new(&Settings::default()).context("input backend unavailable")?;
        Ok(Self { enigo, settle })
    }
}

impl Controls for EnigoControls {
    fn click(&mut self, point: Point) {
        if let Err(e) = self.enigo.move_mouse(point.0, point.1, Coordinate::Abs) {
            log::warn!("mouse move to {point:?} failed: {e}");
            return;
        }
        thread::sleep(MOVE_CLICK_GAP);
        if let Err(e) = self.enigo.button(Button::Left, Direction::Click) {
            log::warn!("click at {point:?} failed: {e}");
        }
        thread::sleep(self.settle);
    }

    fn press_cancel(&mut self) {
        if let Err(e) = self.enigo.key(Key::Escape, Direction::Click) {
            log::warn!("escape press failed: {e}");
        }
        thread::sleep(self.settle);
    }
}
