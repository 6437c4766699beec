//! Recovery cascade behavior against scripted screens.

mod common;

use std::sync::Arc;

use common::{FakeEyes, FakeHands, fast_config, fast_timeouts};
use legends_core::{Anchor, Config, Engine, FarmError, RuntimeState};

fn engine_with(
    eyes: FakeEyes,
    hands: FakeHands,
    cfg: Config,
) -> (Engine<FakeEyes, FakeHands>, Arc<RuntimeState>) {
    let state = Arc::new(RuntimeState::new());
    let engine = Engine::new(eyes, hands, cfg, Arc::clone(&state)).with_timeouts(fast_timeouts());
    (engine, state)
}

fn engine(eyes: FakeEyes, hands: FakeHands) -> (Engine<FakeEyes, FakeHands>, Arc<RuntimeState>) {
    engine_with(eyes, hands, fast_config())
}

#[test]
fn smart_recovery_resumes_from_the_results_screen() {
    let eyes = FakeEyes::new()
        .show(Anchor::BattleOk, (70, 70))
        .show(Anchor::Yes, (30, 30));
    let hands = FakeHands::new();
    let (mut engine, _) = engine(eyes, hands.clone());

    assert!(engine.smart_recover());
    assert!(hands.clicked((70, 70)));
    assert!(hands.clicked((30, 30)));
}

#[test]
fn smart_recovery_prefers_the_deepest_screen() {
    // Battle completion outranks the results button when both are visible.
    let eyes = FakeEyes::new()
        .show(Anchor::BattleEnd, (60, 60))
        .show(Anchor::BattleOk, (70, 70))
        .show(Anchor::Yes, (30, 30));
    let hands = FakeHands::new();
    let (mut engine, _) = engine(eyes, hands.clone());

    assert!(engine.smart_recover());
    let first = hands.clicks.lock().unwrap().first().copied();
    assert_eq!(first, Some((60, 60)));
}

#[test]
fn smart_recovery_backs_out_of_the_team_screen() {
    // Only the team screen is visible and there is no back button, so a
    // cancel press is sent; with no start button after, nothing resumes.
    let eyes = FakeEyes::new().show(Anchor::Ready, (50, 50));
    let hands = FakeHands::new();
    let (mut engine, _) = engine(eyes, hands.clone());

    assert!(!engine.smart_recover());
    assert_eq!(hands.cancel_count(), 1);
}

#[test]
fn smart_recovery_unrecognized_screen_returns_false() {
    let (mut engine, _) = engine(FakeEyes::new(), FakeHands::new());
    assert!(!engine.smart_recover());
}

#[test]
fn generic_recovery_stops_at_the_home_screen() {
    // Home shortcut visible immediately; the Story button appears only
    // after it is clicked.
    let eyes = FakeEyes::new()
        .show(Anchor::Home, (90, 90))
        .show_after(Anchor::Story, (11, 11), 1)
        .show(Anchor::Continue, (12, 12))
        .show(Anchor::Yes, (30, 30));
    let hands = FakeHands::new();
    let (mut engine, _) = engine(eyes, hands.clone());

    let attempts = engine.generic_recover().unwrap();
    assert_eq!(attempts, 1);
    assert!(hands.clicked((90, 90)));
    // Setup ran afterwards: Story and Continue were clicked.
    assert!(hands.clicked((11, 11)));
    assert!(hands.clicked((12, 12)));
}

#[test]
fn generic_recovery_backs_out_step_by_step() {
    // A back button at a weak score: visible only at the loosened recovery
    // threshold. Story appears after two back steps.
    let eyes = FakeEyes::new()
        .show_scored(Anchor::Back, (95, 95), 0.65)
        .show_after(Anchor::Story, (11, 11), 2)
        .show(Anchor::Continue, (12, 12))
        .show(Anchor::Yes, (30, 30));
    let hands = FakeHands::new();
    let (mut engine, _) = engine(eyes, hands.clone());

    let attempts = engine.generic_recover().unwrap();
    assert!(attempts >= 2);
    assert!(hands.clicked((95, 95)));
    assert!(hands.clicked((11, 11)));
}

#[test]
fn generic_recovery_exhausts_on_a_dead_screen() {
    let (mut engine, _) = engine(FakeEyes::new(), FakeHands::new());

    let err = engine.generic_recover().unwrap_err();
    assert_eq!(
        err,
        FarmError::RecoveryExhausted {
            attempts: fast_config().max_tries
        }
    );
}

#[test]
fn recover_counts_and_restores_status() {
    let eyes = FakeEyes::new()
        .show(Anchor::BattleOk, (70, 70))
        .show(Anchor::Yes, (30, 30));
    let (mut engine, state) = engine(eyes, FakeHands::new());

    engine.recover();
    let snap = state.snapshot();
    assert_eq!(snap.recoveries, 1);
    assert_eq!(snap.status, "farming");
}
