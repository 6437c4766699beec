//! Re-synchronization after the bot loses track of where it is.
//!
//! Smart recovery first: an ordered cascade of known-screen checks, each
//! resuming the scripted flow from the matching point. If no known screen
//! is visible, generic recovery backs out toward the home screen one
//! navigation step at a time.

use std::thread;

use crate::anchor::Anchor;
use crate::engine::Engine;
use crate::error::{FarmError, Result};
use crate::{Controls, Perception};

impl<P: Perception, C: Controls> Engine<P, C> {
    /// Full recovery dispatch: smart first, generic as the fallback.
    /// Exhausted generic recovery is a soft failure; the outer loop just
    /// runs another detection cycle.
    pub fn recover(&mut self) {
        self.state.add_recovery();
        self.state.set_status("recovering");

        if self.smart_recover() {
            self.state.set_status("farming");
            return;
        }

        match self.generic_recover() {
            Ok(attempts) => {
                log::info!("generic recovery reached home after {attempts} attempt(s)")
            }
            Err(e) => log::error!("{e}; continuing with the next detection cycle"),
        }
        self.state.set_status("farming");
    }

    /// Try to recognize the current screen and resume from it. Checks run
    /// in order from deepest in the flow to shallowest, so a screen showing
    /// several anchors resumes from the furthest-along point.
    pub fn smart_recover(&mut self) -> bool {
        self.state.set_action("smart recovery");

        if self.eyes.find(Anchor::BattleEnd).is_some() {
            log::info!("resuming: battle completion visible");
            if self.wait_battle_end().is_ok() {
                let _ = self.results_sequence();
            }
            return true;
        }

        if self.eyes.find(Anchor::BattleOk).is_some() {
            log::info!("resuming: results screen visible");
            let _ = self.results_sequence();
            return true;
        }

        // Team screen with no memory of how we got here: back out once and
        // restart the combat sequence if the start button reappears.
        if self.eyes.find(Anchor::Ready).is_some() {
            log::info!("resuming: team screen visible, backing out");
            match self
                .eyes
                .find_with_threshold(Anchor::Back, self.cfg.back_confidence)
            {
                Some(point) => self.hands.click(point),
                None => self.hands.press_cancel(),
            }
            thread::sleep(self.cfg.settle_delay());
            if self.eyes.find(Anchor::StartBattle).is_some() {
                let _ = self.handle_combat();
                return true;
            }
        }

        if self.eyes.find(Anchor::StartBattle).is_some() {
            log::info!("resuming: level screen visible");
            let _ = self.handle_combat();
            return true;
        }

        if self.eyes.find(Anchor::StorySlide).is_some() || self.eyes.find(Anchor::Skip).is_some() {
            log::info!("resuming: cinematic visible");
            let _ = self.handle_cinematic();
            return true;
        }

        if self.eyes.find(Anchor::Tap).is_some() {
            log::info!("resuming: tap prompt visible");
            self.drain_taps();
            return true;
        }

        if let Some(point) = self.eyes.find(Anchor::Yes) {
            log::info!("resuming: confirmation visible");
            self.hands.click(point);
            return true;
        }

        if self.eyes.find(Anchor::Story).is_some() {
            log::info!("resuming: home screen visible");
            self.setup();
            return true;
        }

        log::info!("no known screen recognized");
        false
    }

    /// Back out toward the home screen one step at a time. Returns the
    /// number of attempts used; exhausting the budget is an error.
    pub fn generic_recover(&mut self) -> Result<u32> {
        self.state.set_action("generic recovery");

        for attempt in 1..=self.cfg.max_tries {
            if self.eyes.find(Anchor::Story).is_some() {
                log::info!("home screen reached on attempt {attempt}");
                self.setup();
                return Ok(attempt);
            }

            if let Some(point) = self.eyes.find(Anchor::Home) {
                log::info!("home shortcut visible on attempt {attempt}");
                self.hands.click(point);
                thread::sleep(self.cfg.settle_delay());
                self.setup();
                return Ok(attempt);
            }

            // Back arrows blend into busy scenery, hence the looser
            // threshold here.
            if let Some(point) = self
                .eyes
                .find_with_threshold(Anchor::Back, self.cfg.back_confidence)
            {
                log::info!("backing out (attempt {attempt})");
                self.hands.click(point);
                thread::sleep(self.cfg.settle_delay());
                if let Some(close) = self.eyes.find(Anchor::Close) {
                    self.hands.click(close);
                }
                self.drain_taps();
                if let Some(no) = self.eyes.find(Anchor::No) {
                    self.hands.click(no);
                }
                continue;
            }

            log::info!("no navigation control visible, sending cancel (attempt {attempt})");
            if let Some(point) = self.eyes.find(Anchor::Tap) {
                self.hands.click(point);
            }
            self.hands.press_cancel();
            thread::sleep(self.cfg.settle_delay());
        }

        Err(FarmError::RecoveryExhausted {
            attempts: self.cfg.max_tries,
        })
    }
}
