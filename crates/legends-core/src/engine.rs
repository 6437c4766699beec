//! The per-level-type state machine: detection, setup, and the scripted
//! combat and cinematic sequences.
//!
//! The engine is generic over [`Perception`] and [`Controls`] so every
//! sequence can be exercised against scripted fakes.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::anchor::Anchor;
use crate::config::Config;
use crate::error::{FarmError, Result};
use crate::poll;
use crate::state::RuntimeState;
use crate::{Controls, Perception, Point};

/// What kind of level the detection pass decided we are looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Combat,
    Cinematic,
    Unknown,
}

/// Per-step bounds of the scripted sequences. Defaults match the cadence of
/// the live game; tests shrink them to milliseconds.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Level-type detection window.
    pub detect: Duration,
    /// Poll interval during level-type detection.
    pub detect_interval: Duration,
    /// Demo-toggle verification window.
    pub demo: Duration,
    /// Start-battle button wait.
    pub start_battle: Duration,
    /// Team-selection landmark wait (non-fatal).
    pub team: Duration,
    /// Ready button wait.
    pub ready: Duration,
    /// Results-confirm button wait.
    pub results_ok: Duration,
    /// Replay confirmation wait.
    pub replay_yes: Duration,
    /// Skip-confirmation wait after a cinematic skip.
    pub skip_confirm: Duration,
    /// Gap between polls while draining tap prompts.
    pub tap_gap: Duration,
    /// Cap on tap prompts drained in one pass.
    pub max_taps: u32,
    /// Attempts for opportunistic confirmation clicks.
    pub confirm_tries: u32,
    /// Delay between opportunistic confirmation attempts.
    pub confirm_delay: Duration,
    /// Breather between outer loop iterations.
    pub breather: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            detect: Duration::from_secs(45),
            detect_interval: Duration::from_millis(300),
            demo: Duration::from_secs(20),
            start_battle: Duration::from_secs(30),
            team: Duration::from_secs(60),
            ready: Duration::from_secs(30),
            results_ok: Duration::from_secs(20),
            replay_yes: Duration::from_secs(30),
            skip_confirm: Duration::from_secs(15),
            tap_gap: Duration::from_millis(500),
            max_taps: 10,
            confirm_tries: 8,
            confirm_delay: Duration::from_millis(500),
            breather: Duration::from_millis(500),
        }
    }
}

/// Main control line of the farmer.
pub struct Engine<P: Perception, C: Controls> {
    pub(crate) eyes: P,
    pub(crate) hands: C,
    pub(crate) cfg: Config,
    pub(crate) state: Arc<RuntimeState>,
    pub(crate) timeouts: Timeouts,
}

impl<P: Perception, C: Controls> Engine<P, C> {
    pub fn new(eyes: P, hands: C, cfg: Config, state: Arc<RuntimeState>) -> Self {
        Self {
            eyes,
            hands,
            cfg,
            state,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Wait for an anchor and click it. Timeout requests recovery and
    /// returns [`FarmError::NotFound`].
    pub fn wait_and_click(&mut self, anchor: Anchor, timeout: Duration) -> Result<Point> {
        self.state.set_action(&format!("waiting for {anchor}"));
        let interval = self.cfg.poll_delay();
        let eyes = &mut self.eyes;
        match poll::poll_until(timeout, interval, || eyes.find(anchor)) {
            Some(point) => {
                log::debug!("clicking {anchor} at {point:?}");
                self.hands.click(point);
                Ok(point)
            }
            None => {
                log::warn!("{anchor} not seen within {timeout:?}");
                self.state.request_recovery();
                Err(FarmError::NotFound {
                    anchor,
                    waited: timeout,
                })
            }
        }
    }

    /// Opportunistic bounded click; absence is not a failure.
    pub fn try_click(&mut self, anchor: Anchor, tries: u32, delay: Duration) -> bool {
        for _ in 0..tries {
            if let Some(point) = self.eyes.find(anchor) {
                self.hands.click(point);
                return true;
            }
            thread::sleep(delay);
        }
        log::debug!("{anchor} not found after {tries} tries");
        false
    }

    /// Click tap prompts until they stop coming. A prompt can arrive late,
    /// so apparent absence is re-checked once before concluding drained.
    pub fn drain_taps(&mut self) -> u32 {
        let mut taps = 0;
        while taps < self.timeouts.max_taps {
            thread::sleep(self.timeouts.tap_gap);
            if let Some(point) = self.eyes.find(Anchor::Tap) {
                self.hands.click(point);
                taps += 1;
                continue;
            }
            thread::sleep(self.timeouts.tap_gap);
            match self.eyes.find(Anchor::Tap) {
                Some(point) => {
                    self.hands.click(point);
                    taps += 1;
                }
                None => break,
            }
        }
        if taps > 0 {
            log::info!("drained {taps} tap prompt(s)");
        }
        taps
    }

    /// Decide what kind of level is on screen. First signal wins; the
    /// detection bound expiring means we are lost and the caller recovers.
    pub fn detect_level(&mut self) -> LevelKind {
        self.state.set_action("detecting level type");
        let eyes = &mut self.eyes;
        let found = poll::poll_until(
            self.timeouts.detect,
            self.timeouts.detect_interval,
            || {
                if eyes.find(Anchor::StartBattle).is_some() {
                    return Some(LevelKind::Combat);
                }
                if eyes.find(Anchor::StorySlide).is_some() || eyes.find(Anchor::Skip).is_some() {
                    return Some(LevelKind::Cinematic);
                }
                None
            },
        );
        match found {
            Some(kind) => {
                log::info!("level type: {kind:?}");
                kind
            }
            None => {
                log::warn!("level type unknown after {:?}", self.timeouts.detect);
                LevelKind::Unknown
            }
        }
    }

    /// Startup sequence from the home screen: Story, Continue, optional
    /// confirmation. The first two waits are unbounded; the watchdog is
    /// trusted to unwedge anything that blocks them.
    pub fn setup(&mut self) {
        log::info!("running setup sequence");
        self.state.set_status("setup");
        let interval = self.cfg.poll_delay();

        self.state.set_action("waiting for Story");
        let story = {
            let eyes = &mut self.eyes;
            poll::poll_forever(interval, || eyes.find(Anchor::Story))
        };
        self.hands.click(story);

        self.state.set_action("waiting for Continue");
        let cont = {
            let eyes = &mut self.eyes;
            poll::poll_forever(interval, || eyes.find(Anchor::Continue))
        };
        self.hands.click(cont);

        thread::sleep(self.cfg.settle_delay());
        self.try_click(
            Anchor::Yes,
            self.timeouts.confirm_tries,
            self.timeouts.confirm_delay,
        );
        log::info!("setup complete");
    }

    /// Run one combat level start to finish.
    ///
    /// Guarantees the busy flag is false when this returns, success or not.
    pub fn handle_combat(&mut self) -> Result<()> {
        self.state.set_status("combat");
        let result = self.combat_sequence();
        self.state.leave_combat();
        if let Err(e) = &result {
            log::warn!("combat sequence aborted: {e}");
        }
        result
    }

    fn combat_sequence(&mut self) -> Result<()> {
        // The demo toggle replays a recorded battle instead of fighting one;
        // it must be off. Unconfirmed state is logged and tolerated.
        self.ensure_demo_off();

        self.wait_and_click(Anchor::StartBattle, self.timeouts.start_battle)?;
        thread::sleep(self.cfg.settle_delay());
        self.try_click(
            Anchor::Yes,
            self.timeouts.confirm_tries,
            self.timeouts.confirm_delay,
        );

        self.select_team();

        self.wait_and_click(Anchor::Ready, self.timeouts.ready)?;
        thread::sleep(self.cfg.settle_delay());
        self.try_click(
            Anchor::Yes,
            self.timeouts.confirm_tries,
            self.timeouts.confirm_delay,
        );

        self.state.enter_combat();
        self.state.set_status("combat running");
        let battle = self.wait_battle_end();
        self.state.leave_combat();
        battle?;

        // The retry button only exists on the defeat screen; a stricter
        // threshold keeps it from being hallucinated out of noise.
        thread::sleep(self.cfg.settle_delay());
        if let Some(point) = self
            .eyes
            .find_with_threshold(Anchor::Retry, self.cfg.retry_confidence)
        {
            log::info!("defeat detected, taking the rematch");
            self.hands.click(point);
            self.state.enter_combat();
            let rematch = self.wait_battle_end();
            self.state.leave_combat();
            rematch?;
        }

        self.results_sequence()
    }

    /// Poll for the battle-finished indicator up to the combat ceiling and
    /// click it. The ceiling expiring is a failure.
    pub(crate) fn wait_battle_end(&mut self) -> Result<()> {
        self.state.set_action("waiting for battle to finish");
        let ceiling = self.cfg.combat_timeout();
        let interval = self.cfg.poll_delay();
        let eyes = &mut self.eyes;
        match poll::poll_until(ceiling, interval, || eyes.find(Anchor::BattleEnd)) {
            Some(point) => {
                self.hands.click(point);
                Ok(())
            }
            None => {
                log::warn!("battle still running after {ceiling:?}");
                self.state.request_recovery();
                Err(FarmError::NotFound {
                    anchor: Anchor::BattleEnd,
                    waited: ceiling,
                })
            }
        }
    }

    /// Results screens plus the replay confirmation (combat steps 7 and 8).
    /// Also the resumption point for smart recovery.
    pub(crate) fn results_sequence(&mut self) -> Result<()> {
        self.state.set_action("clearing results");
        for _ in 0..2 {
            self.drain_taps();
            self.wait_and_click(Anchor::BattleOk, self.timeouts.results_ok)?;
        }
        thread::sleep(self.cfg.settle_delay());
        self.wait_and_click(Anchor::Yes, self.timeouts.replay_yes)?;
        Ok(())
    }

    /// Verify the demo toggle reads OFF, clicking it off if needed.
    ///
    /// The two toggle states look nearly identical, so both templates are
    /// scored against one frame and the higher score is taken as the real
    /// state.
    fn ensure_demo_off(&mut self) -> bool {
        self.state.set_action("checking demo toggle");
        let deadline = Instant::now() + self.timeouts.demo;
        while Instant::now() < deadline {
            match self.eyes.classify_best(&[Anchor::DemoOff, Anchor::DemoOn]) {
                Some((Anchor::DemoOff, _)) => {
                    log::debug!("demo toggle is off");
                    return true;
                }
                Some((Anchor::DemoOn, point)) => {
                    log::info!("demo toggle is on, clicking it off");
                    self.hands.click(point);
                    thread::sleep(self.cfg.settle_delay());
                    if let Some((Anchor::DemoOff, _)) =
                        self.eyes.classify_best(&[Anchor::DemoOff, Anchor::DemoOn])
                    {
                        return true;
                    }
                }
                _ => thread::sleep(self.cfg.poll_delay()),
            }
        }
        log::warn!("demo toggle state unconfirmed, continuing anyway");
        false
    }

    /// Wait for the team screen landmark, then click the configured slots
    /// in order. Timeout skips slot selection; the saved team still fights.
    fn select_team(&mut self) {
        self.state.set_action("selecting team");
        let interval = self.cfg.poll_delay();
        let seen = {
            let eyes = &mut self.eyes;
            poll::poll_until(self.timeouts.team, interval, || {
                eyes.find(Anchor::TeamPointer)
            })
        };
        if seen.is_none() {
            log::warn!("team screen landmark not seen, skipping slot selection");
            return;
        }
        let slots = self.cfg.team_slots.clone();
        for &slot in &slots {
            self.hands.click(slot);
        }
        thread::sleep(self.cfg.settle_delay());
    }

    /// Run one cinematic level: click the skip control, confirm.
    pub fn handle_cinematic(&mut self) -> Result<()> {
        self.state.set_status("cinematic");
        self.state.set_action("skipping cinematic");

        let rect = self.eyes.window_rect();
        let Some(point) = self.cfg.skip_position.resolve(rect) else {
            log::warn!("cannot resolve skip position, window geometry unavailable");
            self.state.request_recovery();
            return Err(FarmError::CaptureFailed);
        };
        self.hands.click(point);

        thread::sleep(self.cfg.settle_delay());
        self.wait_and_click(Anchor::Yes, self.timeouts.skip_confirm)?;
        Ok(())
    }

    /// The outer loop: detect, handle, recover; forever. Returns only when
    /// perception reports the target window gone.
    pub fn run(&mut self) -> Result<()> {
        log::info!("farming loop started");
        self.state.set_status("farming");

        loop {
            if !self.eyes.healthy() {
                log::error!("too many consecutive capture failures, giving up");
                return Err(FarmError::CaptureFailed);
            }

            if self.state.take_recovery_request() {
                log::info!("recovery requested by the watchdog");
                self.recover();
                continue;
            }

            match self.detect_level() {
                LevelKind::Combat => match self.handle_combat() {
                    Ok(()) => {
                        self.state.add_loop();
                        self.state.add_completed();
                        let snap = self.state.snapshot();
                        log::info!(
                            "combat done | battles: {} | total: {}",
                            snap.loops,
                            snap.completed
                        );
                    }
                    Err(_) => {
                        self.state.take_recovery_request();
                        self.recover();
                    }
                },
                LevelKind::Cinematic => match self.handle_cinematic() {
                    Ok(()) => {
                        self.state.add_cinematic();
                        self.state.add_completed();
                        let snap = self.state.snapshot();
                        log::info!("cinematic skipped | total: {}", snap.completed);
                    }
                    Err(_) => {
                        self.state.take_recovery_request();
                        self.recover();
                    }
                },
                LevelKind::Unknown => {
                    self.state.take_recovery_request();
                    self.recover();
                }
            }

            self.state.set_status("farming");
            thread::sleep(self.timeouts.breather);
        }
    }
}
