//! The shared game interface and the closed set of games.

use std::fmt;
use std::time::{Duration, Instant};

use gesture_count::SessionResult;

use crate::click::ImpossibleClick;
use crate::hand::HandAlternator;
use crate::matcha::MatchaWhisking;

// ════════════════════════════════════════════════════════════════════════════
// GameKind
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameKind {
    MatchaWhisking,
    HandAlternator,
    ImpossibleClick,
}

impl GameKind {
    pub const ALL: [GameKind; 3] =
        [GameKind::MatchaWhisking, GameKind::HandAlternator, GameKind::ImpossibleClick];

    pub fn title(self) -> &'static str {
        match self {
            GameKind::MatchaWhisking  => "Matcha Whisking",
            GameKind::HandAlternator  => "Hand Alternator",
            GameKind::ImpossibleClick => "Click the Runaway",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameKind::MatchaWhisking  => "Whisk the matcha up to the red line",
            GameKind::HandAlternator  => "Alternate raising your hands 10 times",
            GameKind::ImpossibleClick => "Click the runaway... if you can",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            GameKind::MatchaWhisking  => Duration::from_secs(10),
            GameKind::HandAlternator  => Duration::from_secs(30),
            GameKind::ImpossibleClick => Duration::from_secs(15),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Input and results
// ════════════════════════════════════════════════════════════════════════════

/// Input routed from the game window.  Coordinates are window-local.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameInput {
    PointerMoved { x: f32, y: f32 },
    Click { x: f32, y: f32 },
    /// Credit one alternation by hand (SPACE).
    Simulate,
    /// Reopen the camera (C).
    RetryCamera,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    Won,
    Lost,
}

impl GameOutcome {
    pub fn from_result(result: SessionResult) -> Option<Self> {
        match result {
            SessionResult::Won     => Some(GameOutcome::Won),
            SessionResult::Lost    => Some(GameOutcome::Lost),
            SessionResult::Pending => None,
        }
    }
}

/// A finished game, as reported to the pet.
#[derive(Clone, Debug, PartialEq)]
pub struct GameReport {
    pub kind:    GameKind,
    pub outcome: GameOutcome,
    /// Short human summary, e.g. `"7/10 alternations"`.
    pub detail:  String,
}

// ════════════════════════════════════════════════════════════════════════════
// MiniGame trait
// ════════════════════════════════════════════════════════════════════════════

pub trait MiniGame {
    fn kind(&self) -> GameKind;

    fn start(&mut self, now: Instant);

    /// Advance game time.  Resolves the result once the game's condition or
    /// deadline is met.
    fn tick(&mut self, now: Instant);

    fn handle_input(&mut self, input: GameInput, now: Instant);

    /// Stop the game and release anything it holds.  Idempotent.
    fn end(&mut self);

    fn result(&self) -> SessionResult;

    /// One-line status for the game window.
    fn status_line(&self, now: Instant) -> String;

    fn detail(&self) -> String;
}

// ════════════════════════════════════════════════════════════════════════════
// ActiveGame: the closed set
// ════════════════════════════════════════════════════════════════════════════

pub enum ActiveGame {
    Matcha(MatchaWhisking),
    Hand(HandAlternator),
    Click(ImpossibleClick),
}

impl ActiveGame {
    pub fn as_game(&self) -> &dyn MiniGame {
        match self {
            ActiveGame::Matcha(g) => g,
            ActiveGame::Hand(g)   => g,
            ActiveGame::Click(g)  => g,
        }
    }

    pub fn as_game_mut(&mut self) -> &mut dyn MiniGame {
        match self {
            ActiveGame::Matcha(g) => g,
            ActiveGame::Hand(g)   => g,
            ActiveGame::Click(g)  => g,
        }
    }

    pub fn kind(&self) -> GameKind { self.as_game().kind() }
    pub fn result(&self) -> SessionResult { self.as_game().result() }

    /// The report for a finished game; `None` while pending.
    pub fn report(&self) -> Option<GameReport> {
        let game = self.as_game();
        GameOutcome::from_result(game.result()).map(|outcome| GameReport {
            kind: game.kind(),
            outcome,
            detail: game.detail(),
        })
    }
}

impl fmt::Debug for ActiveGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActiveGame({}, {:?})", self.kind(), self.result())
    }
}
