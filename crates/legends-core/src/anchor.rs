//! The fixed vocabulary of visual anchors the farmer can recognize.
//!
//! Each anchor corresponds to one reference image captured from the game
//! with the capture tool; file names below are the names that tool writes.

use std::fmt;

/// A recognizable visual landmark tied to one game screen or control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// "Story" button on the home screen.
    Story,
    /// "Continue" button that resumes the current quest.
    Continue,
    /// The stage/level tile to enter.
    Mission,
    /// "Play Demo" checkbox in its empty state (the state we want).
    DemoOff,
    /// "Play Demo" checkbox ticked (must be clicked off before battle).
    DemoOn,
    /// "Start Battle" button.
    StartBattle,
    /// Generic "Yes" confirmation.
    Yes,
    /// Generic "No" / refuse button.
    No,
    /// Landmark on the team-selection screen.
    TeamPointer,
    /// "Ready" button after team selection.
    Ready,
    /// Indicator that the battle has finished.
    BattleEnd,
    /// "Tap to continue" arrow on result/levelup screens.
    Tap,
    /// "OK" button on the battle results screen.
    BattleOk,
    /// "Skip" button shown during cinematics.
    Skip,
    /// Story-slide frame (dialogue box over a cinematic).
    StorySlide,
    /// General navigation arrow.
    Arrow,
    /// Close (X) button on popups.
    Close,
    /// In-game back button.
    Back,
    /// In-game home button (returns to the main menu).
    Home,
    /// Rematch button shown only after a defeat.
    Retry,
}

impl Anchor {
    /// Every anchor, in catalog-load order.
    pub const ALL: &'static [Anchor] = &[
        Anchor::Story,
        Anchor::Continue,
        Anchor::Mission,
        Anchor::DemoOff,
        Anchor::DemoOn,
        Anchor::StartBattle,
        Anchor::Yes,
        Anchor::No,
        Anchor::TeamPointer,
        Anchor::Ready,
        Anchor::BattleEnd,
        Anchor::Tap,
        Anchor::BattleOk,
        Anchor::Skip,
        Anchor::StorySlide,
        Anchor::Arrow,
        Anchor::Close,
        Anchor::Back,
        Anchor::Home,
        Anchor::Retry,
    ];

    /// File name of the reference image inside the asset directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Anchor::Story => "story.png",
            Anchor::Continue => "continue.png",
            Anchor::Mission => "mission.png",
            Anchor::DemoOff => "demo.png",
            Anchor::DemoOn => "demo_checked.png",
            Anchor::StartBattle => "startbattle.png",
            Anchor::Yes => "yes.png",
            Anchor::No => "no.png",
            Anchor::TeamPointer => "legendspointer.png",
            Anchor::Ready => "ready.png",
            Anchor::BattleEnd => "finishedpointer.png",
            Anchor::Tap => "tap.png",
            Anchor::BattleOk => "okbattle.png",
            Anchor::Skip => "skip.png",
            Anchor::StorySlide => "storyslide.png",
            Anchor::Arrow => "arrow.png",
            Anchor::Close => "close.png",
            Anchor::Back => "back.png",
            Anchor::Home => "home.png",
            Anchor::Retry => "retry.png",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Watchdog corrective-click priorities, highest first. When the screen is
/// stale the first visible entry wins.
pub const PRIORITY_TABLE: &[(Anchor, u8)] = &[
    (Anchor::Skip, 15),
    (Anchor::Arrow, 13),
    (Anchor::Close, 12),
    (Anchor::Tap, 11),
    (Anchor::No, 10),
    (Anchor::Yes, 9),
    (Anchor::StartBattle, 8),
    (Anchor::DemoOff, 7),
    (Anchor::BattleOk, 6),
    (Anchor::Ready, 5),
    (Anchor::Story, 3),
    (Anchor::Continue, 1),
    (Anchor::Mission, 0),
];

/// Screens the watchdog accepts as "somewhere the bot knows". If none of
/// these is visible the bot has wandered off (shop, event popup, ...) and
/// recovery is requested.
pub const WATCHDOG_WHITELIST: &[Anchor] = &[
    Anchor::StartBattle,
    Anchor::Story,
    Anchor::StorySlide,
    Anchor::Skip,
    Anchor::BattleEnd,
    Anchor::BattleOk,
    Anchor::Yes,
    Anchor::Ready,
    Anchor::Continue,
];
