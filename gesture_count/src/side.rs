//! Which hand is up, and a single timestamped observation of it.

use std::fmt;
use std::time::Instant;

/// The dominant side reported by a detector for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Side {
    Left,
    Right,
    #[default]
    None,
}

impl Side {
    /// The side a successful alternation must flip to.
    pub fn opposite(self) -> Side {
        match self {
            Side::Left  => Side::Right,
            Side::Right => Side::Left,
            Side::None  => Side::None,
        }
    }

    pub fn is_hand(self) -> bool { self != Side::None }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left  => "left up",
            Side::Right => "right up",
            Side::None  => "neutral",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One processed frame's verdict: a side, how sure the detector is, and when
/// the frame was captured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSample {
    pub side:       Side,
    /// 0.0–1.0.
    pub confidence: f32,
    pub at:         Instant,
}

impl GestureSample {
    pub fn new(side: Side, confidence: f32, at: Instant) -> Self {
        GestureSample { side, confidence: confidence.clamp(0.0, 1.0), at }
    }

    /// A sample with no hand in it.
    pub fn none(at: Instant) -> Self {
        GestureSample { side: Side::None, confidence: 0.0, at }
    }

    /// True when the sample names a hand with at least `floor` confidence.
    pub fn is_confident(&self, floor: f32) -> bool {
        self.side.is_hand() && self.confidence >= floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_flips_hands_only() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
        assert_eq!(Side::None.opposite(), Side::None);
    }

    #[test]
    fn confidence_is_clamped() {
        let s = GestureSample::new(Side::Left, 3.0, Instant::now());
        assert_eq!(s.confidence, 1.0);
    }

    #[test]
    fn none_is_never_confident() {
        let s = GestureSample::new(Side::None, 1.0, Instant::now());
        assert!(!s.is_confident(0.0));
    }
}
