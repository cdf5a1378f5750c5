//! Dwell tracking and the alternation counter.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::side::{GestureSample, Side};

/// How long a side has to be held before it counts as active.
pub const DEFAULT_DWELL: Duration = Duration::from_secs(1);

/// Samples below this confidence are treated like dropouts.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

// ════════════════════════════════════════════════════════════════════════════
// GestureState
// ════════════════════════════════════════════════════════════════════════════

/// The side currently being held and since when.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureState {
    side:       Side,
    held_since: Option<Instant>,
}

impl GestureState {
    pub fn side(&self) -> Side { self.side }
    pub fn held_since(&self) -> Option<Instant> { self.held_since }

    /// How long the current side has been held as of `now`.
    pub fn held_for(&self, now: Instant) -> Duration {
        self.held_since
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO)
    }

    /// Forget the held side entirely (detector lost track, camera restarted).
    pub fn reset(&mut self) {
        *self = GestureState::default();
    }

    fn hold(&mut self, side: Side, at: Instant) {
        if self.side != side || self.held_since.is_none() {
            self.side = side;
            self.held_since = Some(at);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Observation: what one sample did to the counter
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Observation {
    /// No hand, or confidence below the floor.  Dwell untouched.
    Ignored,
    /// A side is being held but has not reached the dwell yet.
    Holding { side: Side, remaining: Duration },
    /// First side to become active since the counter was reset.
    Activated(Side),
    /// Still holding the side that is already active.
    Active(Side),
    /// The active side flipped; `count` is the new total.
    Alternated { side: Side, count: u32 },
}

// ════════════════════════════════════════════════════════════════════════════
// AlternationCounter
// ════════════════════════════════════════════════════════════════════════════

/// Counts dwell-qualified Left ↔ Right flips.  Never decrements.
#[derive(Clone, Debug)]
pub struct AlternationCounter {
    count:          u32,
    last_side:      Side,
    state:          GestureState,
    dwell:          Duration,
    min_confidence: f32,
}

impl Default for AlternationCounter {
    fn default() -> Self {
        AlternationCounter::new(DEFAULT_DWELL, DEFAULT_MIN_CONFIDENCE)
    }
}

impl AlternationCounter {
    pub fn new(dwell: Duration, min_confidence: f32) -> Self {
        AlternationCounter {
            count: 0,
            last_side: Side::None,
            state: GestureState::default(),
            dwell,
            min_confidence,
        }
    }

    pub fn count(&self)     -> u32          { self.count }
    pub fn last_side(&self) -> Side         { self.last_side }
    pub fn state(&self)     -> GestureState { self.state }
    pub fn dwell(&self)     -> Duration     { self.dwell }

    /// Feed one sample.
    pub fn observe(&mut self, sample: GestureSample) -> Observation {
        if !sample.is_confident(self.min_confidence) {
            return Observation::Ignored;
        }

        let side = sample.side;
        self.state.hold(side, sample.at);

        let held = self.state.held_for(sample.at);
        if held < self.dwell {
            return Observation::Holding { side, remaining: self.dwell - held };
        }

        if self.last_side == side {
            return Observation::Active(side);
        }

        let previous = self.last_side;
        self.last_side = side;
        if previous == Side::None {
            debug!(%side, "first side active");
            return Observation::Activated(side);
        }

        self.count += 1;
        debug!(%side, count = self.count, "alternation");
        Observation::Alternated { side, count: self.count }
    }

    /// Credit one alternation without a camera (the simulation affordance).
    /// The dwell state is left alone so a real flip still counts afterwards.
    pub fn credit(&mut self) -> u32 {
        self.count += 1;
        self.count
    }

    /// Forget the side being held but keep the count and the last active
    /// side, so the next flip after the interruption still counts.
    pub fn reset_hold(&mut self) {
        self.state.reset();
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.last_side = Side::None;
        self.state.reset();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
