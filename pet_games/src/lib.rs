//! # pet_games
//!
//! The minigames the pet asks you to play.  Every game implements
//! [`MiniGame`]; the set is closed and lives in [`ActiveGame`]:
//!
//! | Kind | Length | Input | Win condition |
//! |---|---|---|---|
//! | [`GameKind::MatchaWhisking`] | 10 s | pointer circles in the bowl | liquid reaches 80 |
//! | [`GameKind::HandAlternator`] | 30 s | webcam (or SPACE to simulate) | 10 left/right alternations |
//! | [`GameKind::ImpossibleClick`] | 15 s | clicks | none: always lost |
//!
//! [`GameManager`] runs at most one game at a time and reports each
//! finished game exactly once as a [`GameReport`].  A game that is closed
//! early produces no report.
//!
//! Games are driven by explicit [`Instant`](std::time::Instant)s so they
//! can be tested without waiting on the wall clock.

pub mod game;
pub mod matcha;
pub mod hand;
pub mod click;
pub mod registry;
pub mod manager;

pub use game::{ActiveGame, GameInput, GameKind, GameOutcome, GameReport, MiniGame};
pub use matcha::MatchaWhisking;
pub use hand::{CameraState, HandAlternator, HandConfig};
pub use click::ImpossibleClick;
pub use registry::GameRegistry;
pub use manager::GameManager;
