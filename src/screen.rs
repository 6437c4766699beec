//! Window lookup and the live screen-capture perception backend.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use image::{DynamicImage, GrayImage, RgbaImage};
use legends_core::{Anchor, FarmError, Perception, Point, WindowRect};
use legends_cv::Catalog;
use xcap::Window;

const LOOKUP_TRIES: u32 = 30;
const LOOKUP_DELAY: Duration = Duration::from_millis(500);

/// Consecutive capture failures after which the window is presumed gone
/// and the farming loop gives up.
const MAX_CONSECUTIVE_FAILURES: u32 = 30;

/// Case-insensitive substring match on window titles. The emulator decorates
/// its title with version numbers, so exact matching would be brittle.
fn find_window(title: &str) -> Option<Window> {
    let needle = title.to_lowercase();
    Window::all()
        .ok()?
        .into_iter()
        .find(|w| w.title().to_lowercase().contains(&needle))
}

/// Block until the target window exists, bounded. On timeout the available
/// titles are logged so the user can fix their config.
pub fn wait_for_window(title: &str) -> legends_core::Result<()> {
    for attempt in 0..LOOKUP_TRIES {
        if let Some(window) = find_window(title) {
            log::info!(
                "found window {:?} ({}x{} at {}, {})",
                window.title(),
                window.width(),
                window.height(),
                window.x(),
                window.y()
            );
            return Ok(());
        }
        if attempt == 0 {
            log::info!("waiting for a window with {title:?} in its title");
        }
        thread::sleep(LOOKUP_DELAY);
    }

    if let Ok(windows) = Window::all() {
        log::error!("no match; capturable windows are:");
        for w in windows {
            if !w.title().is_empty() {
                log::error!("  {:?}", w.title());
            }
        }
    }
    Err(FarmError::WindowUnavailable {
        title: title.to_string(),
    })
}

/// Print every capturable window with its geometry.
pub fn list_windows() -> anyhow::Result<()> {
    let windows = Window::all().context("window enumeration failed")?;
    for w in &windows {
        if w.title().is_empty() {
            continue;
        }
        println!(
            "{:<50} {}x{} at ({}, {})",
            w.title(),
            w.width(),
            w.height(),
            w.x(),
            w.y()
        );
    }
    Ok(())
}

/// One full-color capture of the target window, for cropping new templates.
pub fn capture_window(title: &str) -> anyhow::Result<RgbaImage> {
    let window =
        find_window(title).with_context(|| format!("no window with {title:?} in its title"))?;
    window
        .capture_image()
        .with_context(|| format!("capturing {:?}", window.title()))
}

/// Live [`Perception`] backed by window capture.
///
/// Holds only the title, not a window handle: the window is re-resolved on
/// every capture because the emulator can move, resize, or restart at any
/// time.
pub struct ScreenPerception {
    title: String,
    catalog: Catalog,
    confidence: f32,
    failures: u32,
}

impl ScreenPerception {
    pub fn new(title: String, catalog: Catalog, confidence: f32) -> Self {
        Self {
            title,
            catalog,
            confidence,
            failures: 0,
        }
    }

    fn capture(&mut self) -> Option<(GrayImage, WindowRect)> {
        let Some(window) = find_window(&self.title) else {
            self.note_failure("window not found");
            return None;
        };
        match window.capture_image() {
            Ok(rgba) => {
                self.failures = 0;
                let rect = WindowRect {
                    x: window.x(),
                    y: window.y(),
                    width: window.width(),
                    height: window.height(),
                };
                Some((DynamicImage::ImageRgba8(rgba).into_luma8(), rect))
            }
            Err(e) => {
                self.note_failure(&e.to_string());
                None
            }
        }
    }

    fn note_failure(&mut self, why: &str) {
        self.failures += 1;
        log::warn!("capture failed ({why}), {} in a row", self.failures);
    }
}

impl Perception for ScreenPerception {
    fn find(&mut self, anchor: Anchor) -> Option<Point> {
        self.find_with_threshold(anchor, self.confidence)
    }

    fn find_with_threshold(&mut self, anchor: Anchor, threshold: f32) -> Option<Point> {
        let (frame, rect) = self.capture()?;
        let (cx, cy) = legends_cv::find_with_threshold(&frame, &self.catalog, anchor, threshold)?;
        Some((rect.x + cx as i32, rect.y + cy as i32))
    }

    fn classify_best(&mut self, candidates: &[Anchor]) -> Option<(Anchor, Point)> {
        let (frame, rect) = self.capture()?;
        let (anchor, (cx, cy)) =
            legends_cv::classify_best(&frame, &self.catalog, candidates, self.confidence)?;
        Some((anchor, (rect.x + cx as i32, rect.y + cy as i32)))
    }

    fn stillness(&mut self, interval: Duration) -> Option<u64> {
        let (before, _) = self.capture()?;
        thread::sleep(interval);
        let (after, _) = self.capture()?;
        Some(legends_cv::abs_diff_sum(&before, &after))
    }

    fn window_rect(&mut self) -> Option<WindowRect> {
        let w = find_window(&self.title)?;
        Some(WindowRect {
            x: w.x(),
            y: w.y(),
            width: w.width(),
            height: w.height(),
        })
    }

    fn healthy(&self) -> bool {
        self.failures < MAX_CONSECUTIVE_FAILURES
    }
}
