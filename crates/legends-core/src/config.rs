//! Runtime configuration, loaded once from a JSON file.
//!
//! Missing keys fall back to defaults so old config files keep working when
//! new options are added; a default file is written if none exists.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::WindowRect;

/// Where the cinematic skip control lives on screen.
///
/// `absolute` is a fixed screen pixel pair, measured once. `relative` is a
/// fraction of the target window's content rectangle and survives window
/// moves and resizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SkipPosition {
    Absolute { x: i32, y: i32 },
    Relative { x_pct: f32, y_pct: f32 },
}

impl SkipPosition {
    /// Resolve to a screen coordinate. Relative mode needs the current
    /// window rectangle and yields `None` without one.
    pub fn resolve(&self, window: Option<WindowRect>) -> Option<(i32, i32)> {
        match *self {
            SkipPosition::Absolute { x, y } => Some((x, y)),
            SkipPosition::Relative { x_pct, y_pct } => {
                let rect = window?;
                Some((
                    rect.x + (rect.width as f32 * x_pct) as i32,
                    rect.y + (rect.height as f32 * y_pct) as i32,
                ))
            }
        }
    }
}

/// All tunables for one farming run. Effectively immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Substring of the emulator window title.
    pub window_title: String,
    /// Directory holding the reference images.
    pub asset_dir: PathBuf,
    /// Default detection threshold, 0.0..=1.0.
    pub confidence: f32,
    /// Stricter threshold for the defeat-only retry button, which is easy
    /// to hallucinate out of background noise.
    pub retry_confidence: f32,
    /// Looser threshold for the in-game back button during recovery.
    pub back_confidence: f32,
    /// Delay between polls while waiting for an anchor, in milliseconds.
    pub poll_delay_ms: u64,
    /// Settle delay after every click, in milliseconds.
    pub settle_delay_ms: u64,
    /// Watchdog staleness interval, in seconds.
    pub watchdog_interval_secs: u64,
    /// Attempt cap for generic recovery.
    pub max_tries: u32,
    /// Ceiling on one battle, in seconds.
    pub combat_timeout_secs: u64,
    /// Whether the status reporter thread is started.
    pub overlay_enabled: bool,
    /// Cinematic skip control position.
    pub skip_position: SkipPosition,
    /// Ordered screen coordinates of the three team slots.
    pub team_slots: Vec<(i32, i32)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_title: "BlueStacks App Player".to_string(),
            asset_dir: PathBuf::from("images"),
            confidence: 0.75,
            retry_confidence: 0.85,
            back_confidence: 0.60,
            poll_delay_ms: 1000,
            settle_delay_ms: 500,
            watchdog_interval_secs: 60,
            max_tries: 15,
            combat_timeout_secs: 600,
            overlay_enabled: true,
            skip_position: SkipPosition::Relative {
                x_pct: 0.82,
                y_pct: 0.05,
            },
            team_slots: vec![(620, 640), (720, 640), (820, 640)],
        }
    }
}

impl Config {
    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_secs(self.watchdog_interval_secs)
    }

    pub fn combat_timeout(&self) -> Duration {
        Duration::from_secs(self.combat_timeout_secs)
    }

    /// Load the config file, or create it with defaults if absent.
    ///
    /// Unknown keys are ignored, missing keys take their default. A file
    /// that fails to parse is left untouched and defaults are used for the
    /// run, so a hand-edit typo never wipes the user's file.
    pub fn load_or_create(path: &Path) -> Result<Config> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            match serde_json::from_str::<Config>(&raw) {
                Ok(config) => {
                    log::info!("config loaded from {}", path.display());
                    return Ok(config.clamped());
                }
                Err(e) => {
                    log::warn!("config {} unreadable ({e}), using defaults", path.display());
                    return Ok(Config::default());
                }
            }
        }

        let config = Config::default();
        let pretty = serde_json::to_string_pretty(&config).context("failed to encode defaults")?;
        std::fs::write(path, pretty)
            .with_context(|| format!("failed to write default config: {}", path.display()))?;
        log::info!("default config written to {}", path.display());
        Ok(config)
    }

    /// Force thresholds into [0, 1].
    fn clamped(mut self) -> Config {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self.retry_confidence = self.retry_confidence.clamp(0.0, 1.0);
        self.back_confidence = self.back_confidence.clamp(0.0, 1.0);
        self
    }
}
