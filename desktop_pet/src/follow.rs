//! Cursor-follow controller.
//!
//! | Mode | Target each tick |
//! |---|---|
//! | `Idle` | none; idle physics runs |
//! | `Stalk` | the live pointer |
//! | `Grab` | a point sliding from where the pointer was grabbed to the top centre of the screen |
//! | `Lock` | the pointer position captured when the lock began |
//!
//! While following, the pet's centre moves a fixed fraction of the way to the
//! target, capped per tick, with no gravity or walking.  The mode only changes
//! through [`CursorFollowTarget::set_mode`].

use std::fmt;

use crate::physics::{Bounds, Point};

/// Grab drags the pointer to this height.
pub const GRAB_TOP: f32 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FollowMode {
    #[default]
    Idle,
    Stalk,
    Grab,
    Lock,
}

impl FollowMode {
    pub fn is_following(self) -> bool { self != FollowMode::Idle }

    /// `T` cycles through the modes in this order.
    pub fn next(self) -> FollowMode {
        match self {
            FollowMode::Idle  => FollowMode::Stalk,
            FollowMode::Stalk => FollowMode::Grab,
            FollowMode::Grab  => FollowMode::Lock,
            FollowMode::Lock  => FollowMode::Idle,
        }
    }
}

impl fmt::Display for FollowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FollowMode::Idle  => "idle",
            FollowMode::Stalk => "stalk",
            FollowMode::Grab  => "grab",
            FollowMode::Lock  => "lock",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct GrabPath {
    from: Point,
    to:   Point,
    tick: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CursorFollowTarget {
    mode:            FollowMode,
    locked_position: Option<Point>,
    grab:            Option<GrabPath>,
    reached:         bool,
}

impl CursorFollowTarget {
    pub fn mode(&self)            -> FollowMode    { self.mode }
    pub fn locked_position(&self) -> Option<Point> { self.locked_position }

    /// Switch mode.  `Lock` and `Grab` need a pointer reading to anchor on;
    /// without one the mode is left unchanged and `false` returned.
    pub fn set_mode(&mut self, mode: FollowMode, pointer: Option<Point>, screen: Bounds) -> bool {
        match mode {
            FollowMode::Lock | FollowMode::Grab if pointer.is_none() => return false,
            _ => {}
        }
        self.mode = mode;
        self.reached = false;
        self.locked_position = None;
        self.grab = None;
        match (mode, pointer) {
            (FollowMode::Lock, Some(p)) => self.locked_position = Some(p),
            (FollowMode::Grab, Some(p)) => {
                self.grab = Some(GrabPath { from: p, to: Point::new(screen.width / 2.0, GRAB_TOP), tick: 0 });
            }
            _ => {}
        }
        true
    }

    /// Where the pet heads this tick.  Advances the grab path.
    pub fn target(&mut self, pointer: Option<Point>, grab_ticks: u32) -> Option<Point> {
        match self.mode {
            FollowMode::Idle  => None,
            FollowMode::Stalk => pointer,
            FollowMode::Lock  => self.locked_position,
            FollowMode::Grab  => {
                let path = self.grab.as_mut()?;
                path.tick = path.tick.saturating_add(1);
                let t = path.tick as f32 / grab_ticks.max(1) as f32;
                Some(path.from.lerp(path.to, t))
            }
        }
    }

    /// True once the grab path has reached the top of the screen.
    pub fn grab_finished(&self, grab_ticks: u32) -> bool {
        self.grab.is_some_and(|g| g.tick >= grab_ticks)
    }

    /// True the first time the pet gets within `reach` of its target since
    /// the mode was set.
    pub fn note_reach(&mut self, distance: f32, reach: f32) -> bool {
        if self.reached || distance >= reach {
            return false;
        }
        self.reached = true;
        true
    }
}

/// Step from `from` toward `to`: `fraction` of the distance, at most
/// `max_step` pixels.
pub fn follow_step(from: Point, to: Point, fraction: f32, max_step: f32) -> (f32, f32) {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let (mut sx, mut sy) = (dx * fraction, dy * fraction);
    let len = sx.hypot(sy);
    if len > max_step && len > 0.0 {
        let k = max_step / len;
        sx *= k;
        sy *= k;
    }
    (sx, sy)
}

/// Whether a locked pointer has drifted far enough to be pulled back.
pub fn lock_drifted(locked: Point, pointer: Point, tolerance: f32) -> bool {
    (pointer.x - locked.x).abs() > tolerance || (pointer.y - locked.y).abs() > tolerance
}
