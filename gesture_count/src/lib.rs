//! # gesture_count
//!
//! The dwell-debounced left/right gesture counter and the timed game session
//! that wraps it.  Nothing in here touches a camera or a clock: every sample
//! carries its own [`Instant`](std::time::Instant) and every query takes `now`
//! explicitly, so the whole state machine can be driven from a scripted
//! timeline.
//!
//! ## Counting rule
//!
//! | Sample | Effect |
//! |---|---|
//! | `Side::None` or confidence below the floor | ignored; the dwell timer keeps running |
//! | same side as the one being held | dwell accumulates; side becomes *active* at ≥ 1 s |
//! | different side | new side starts its own dwell |
//! | active side flips Left ↔ Right | counter += 1, `last_side` = new side |
//!
//! ## Session
//!
//! ```text
//!              count ≥ target before deadline
//!   Pending ─────────────────────────────────────▶ Won
//!      │
//!      └──────── deadline reached first ─────────▶ Lost
//! ```
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use gesture_count::{GameSession, GestureSample, SessionConfig, SessionResult, Side};
//!
//! let t0 = Instant::now();
//! let mut session = GameSession::new(SessionConfig::default(), t0);
//! let mut t = t0;
//! for i in 0..11 {
//!     let side = if i % 2 == 0 { Side::Left } else { Side::Right };
//!     session.observe(GestureSample::new(side, 1.0, t));
//!     t += Duration::from_millis(1100);
//!     session.observe(GestureSample::new(side, 1.0, t));
//! }
//! assert_eq!(session.result(), SessionResult::Won);
//! ```

pub mod side;
pub mod counter;
pub mod session;

pub use side::{GestureSample, Side};
pub use counter::{AlternationCounter, GestureState, Observation, DEFAULT_DWELL, DEFAULT_MIN_CONFIDENCE};
pub use session::{GameSession, SessionConfig, SessionResult};
