//! Scripted stand-ins for the screen and input backends.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use legends_core::{Anchor, Config, Controls, Perception, Point, Timeouts, WindowRect};

struct Entry {
    point: Point,
    score: f32,
    /// Number of find-queries for this anchor before it becomes visible.
    delay: u32,
}

/// A screen whose contents are declared up front. Anchors can be made
/// visible immediately, at a given score, or only after a number of
/// queries (to script "appears later" flows).
pub struct FakeEyes {
    visible: HashMap<Anchor, Entry>,
    threshold: f32,
    stillness: Option<u64>,
    rect: Option<WindowRect>,
    healthy: bool,
}

impl FakeEyes {
    pub fn new() -> Self {
        Self {
            visible: HashMap::new(),
            threshold: 0.75,
            stillness: Some(u64::MAX),
            rect: Some(WindowRect {
                x: 0,
                y: 0,
                width: 1280,
                height: 720,
            }),
            healthy: true,
        }
    }

    pub fn show(self, anchor: Anchor, point: Point) -> Self {
        self.show_scored(anchor, point, 0.9)
    }

    pub fn show_scored(mut self, anchor: Anchor, point: Point, score: f32) -> Self {
        self.visible.insert(
            anchor,
            Entry {
                point,
                score,
                delay: 0,
            },
        );
        self
    }

    pub fn show_after(mut self, anchor: Anchor, point: Point, queries: u32) -> Self {
        self.visible.insert(
            anchor,
            Entry {
                point,
                score: 0.9,
                delay: queries,
            },
        );
        self
    }

    pub fn with_stillness(mut self, diff: Option<u64>) -> Self {
        self.stillness = diff;
        self
    }

    pub fn without_rect(mut self) -> Self {
        self.rect = None;
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }
}

impl Perception for FakeEyes {
    fn find(&mut self, anchor: Anchor) -> Option<Point> {
        let threshold = self.threshold;
        self.find_with_threshold(anchor, threshold)
    }

    fn find_with_threshold(&mut self, anchor: Anchor, threshold: f32) -> Option<Point> {
        let entry = self.visible.get_mut(&anchor)?;
        if entry.delay > 0 {
            entry.delay -= 1;
            return None;
        }
        (entry.score >= threshold).then_some(entry.point)
    }

    fn classify_best(&mut self, candidates: &[Anchor]) -> Option<(Anchor, Point)> {
        let mut best: Option<(Anchor, Point, f32)> = None;
        for &anchor in candidates {
            let Some(entry) = self.visible.get(&anchor) else {
                continue;
            };
            if entry.delay > 0 {
                continue;
            }
            match best {
                Some((_, _, score)) if entry.score <= score => {}
                _ => best = Some((anchor, entry.point, entry.score)),
            }
        }
        let (anchor, point, score) = best?;
        (score >= self.threshold).then_some((anchor, point))
    }

    fn stillness(&mut self, _interval: Duration) -> Option<u64> {
        self.stillness
    }

    fn window_rect(&mut self) -> Option<WindowRect> {
        self.rect
    }

    fn healthy(&self) -> bool {
        self.healthy
    }
}

/// Records clicks and cancel presses through shared handles that survive
/// the engine taking ownership.
#[derive(Clone, Default)]
pub struct FakeHands {
    pub clicks: Arc<Mutex<Vec<Point>>>,
    pub cancels: Arc<Mutex<u32>>,
}

impl FakeHands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicked(&self, point: Point) -> bool {
        self.clicks.lock().unwrap().contains(&point)
    }

    pub fn click_count(&self) -> usize {
        self.clicks.lock().unwrap().len()
    }

    pub fn cancel_count(&self) -> u32 {
        *self.cancels.lock().unwrap()
    }
}

impl Controls for FakeHands {
    fn click(&mut self, point: Point) {
        self.clicks.lock().unwrap().push(point);
    }

    fn press_cancel(&mut self) {
        *self.cancels.lock().unwrap() += 1;
    }
}

/// Millisecond-scale step bounds so failure paths run in test time.
pub fn fast_timeouts() -> Timeouts {
    Timeouts {
        detect: Duration::from_millis(20),
        detect_interval: Duration::from_millis(1),
        demo: Duration::from_millis(20),
        start_battle: Duration::from_millis(20),
        team: Duration::from_millis(20),
        ready: Duration::from_millis(20),
        results_ok: Duration::from_millis(20),
        replay_yes: Duration::from_millis(20),
        skip_confirm: Duration::from_millis(20),
        tap_gap: Duration::from_millis(1),
        max_taps: 3,
        confirm_tries: 1,
        confirm_delay: Duration::from_millis(1),
        breather: Duration::from_millis(1),
    }
}

pub fn fast_config() -> Config {
    Config {
        poll_delay_ms: 1,
        settle_delay_ms: 0,
        combat_timeout_secs: 0,
        max_tries: 3,
        ..Config::default()
    }
}
