//! Runs one game at a time and reports each finished game once.

use std::time::Instant;

use rand::Rng;
use tracing::info;

use crate::game::{ActiveGame, GameInput, GameKind, GameReport, MiniGame};
use crate::registry::GameRegistry;

pub struct GameManager {
    registry: GameRegistry,
    current:  Option<ActiveGame>,
}

impl GameManager {
    pub fn new(registry: GameRegistry) -> Self {
        GameManager { registry, current: None }
    }

    pub fn registry(&self) -> &GameRegistry { &self.registry }
    pub fn current(&self) -> Option<&ActiveGame> { self.current.as_ref() }
    pub fn current_mut(&mut self) -> Option<&mut ActiveGame> { self.current.as_mut() }
    pub fn is_running(&self) -> bool { self.current.is_some() }

    /// Start `kind`.  A game already running is ended first, without a
    /// report, and its resources are released before the new one starts.
    pub fn launch<R: Rng + ?Sized>(&mut self, kind: GameKind, rng: &mut R, now: Instant) -> &ActiveGame {
        self.close_current();
        let mut game = self.registry.create(kind, rng);
        game.as_game_mut().start(now);
        info!(game = %kind, "game launched");
        self.current.insert(game)
    }

    pub fn launch_random<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) -> &ActiveGame {
        let kind = self.registry.random_kind(rng);
        self.launch(kind, rng, now)
    }

    /// Advance the running game.  Returns its report on the tick it
    /// finishes; the game is then ended and dropped.
    pub fn tick(&mut self, now: Instant) -> Option<GameReport> {
        let game = self.current.as_mut()?;
        game.as_game_mut().tick(now);
        let report = game.report()?;
        game.as_game_mut().end();
        self.current = None;
        info!(game = %report.kind, outcome = ?report.outcome, detail = %report.detail, "game finished");
        Some(report)
    }

    /// Route window input to the running game.  A result reached through
    /// input is reported on the next [`tick`](Self::tick).
    pub fn handle_input(&mut self, input: GameInput, now: Instant) {
        if let Some(game) = self.current.as_mut() {
            game.as_game_mut().handle_input(input, now);
        }
    }

    /// Forced close (window closed, pet quitting).  No report.
    pub fn close_current(&mut self) -> bool {
        match self.current.take() {
            Some(mut game) => {
                game.as_game_mut().end();
                info!(game = %game.kind(), "game closed early");
                true
            }
            None => false,
        }
    }
}
