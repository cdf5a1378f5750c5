//! Frame-difference motion detection.
//!
//! # Algorithm
//!
//! Each frame is reduced to luma and compared pixel-by-pixel with the frame
//! before it.  A pixel "moved" when the absolute difference exceeds
//! `pixel_threshold`.  Moved pixels are tallied separately for the left and
//! right halves of the (already mirrored) image:
//!
//! | Left active | Right active | Result |
//! |---|---|---|
//! | yes | no  | `Left`, confidence 1.0 |
//! | no  | yes | `Right`, confidence 1.0 |
//! | yes | yes | the side with ≥ `dominance`× the other's motion, confidence 0.75; else `None` |
//! | no  | no  | `None` |
//!
//! A side is active when its tally exceeds `min_pixels`.

use gesture_count::Side;

use crate::frame::Frame;

/// Confidence reported when both halves move but one clearly dominates.
pub const DOMINANT_CONFIDENCE: f32 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    pub pixel_threshold: u8,
    pub min_pixels:      usize,
    pub dominance:       f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig { pixel_threshold: 25, min_pixels: 500, dominance: 1.2 }
    }
}

/// Moved-pixel tallies for one frame pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionReading {
    pub left:  usize,
    pub right: usize,
}

impl MotionReading {
    pub fn classify(&self, config: &MotionConfig) -> (Side, f32) {
        let left_active = self.left > config.min_pixels;
        let right_active = self.right > config.min_pixels;
        match (left_active, right_active) {
            (true, false) => (Side::Left, 1.0),
            (false, true) => (Side::Right, 1.0),
            (true, true) => {
                let (l, r) = (self.left as f32, self.right as f32);
                if l >= r * config.dominance {
                    (Side::Left, DOMINANT_CONFIDENCE)
                } else if r >= l * config.dominance {
                    (Side::Right, DOMINANT_CONFIDENCE)
                } else {
                    (Side::None, 0.0)
                }
            }
            (false, false) => (Side::None, 0.0),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MotionDetector {
    config:   MotionConfig,
    previous: Option<(usize, usize, Vec<u8>)>,
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        MotionDetector { config, previous: None }
    }

    pub fn config(&self) -> &MotionConfig { &self.config }

    /// Tally motion against the previous frame.  `None` for the first frame
    /// and whenever the frame size changes.
    pub fn measure(&mut self, frame: &Frame) -> Option<MotionReading> {
        let luma = frame.luma();
        let reading = match &self.previous {
            Some((w, h, prev)) if *w == frame.width() && *h == frame.height() => {
                Some(self.tally(frame.width(), prev, &luma))
            }
            _ => None,
        };
        self.previous = Some((frame.width(), frame.height(), luma));
        reading
    }

    pub fn detect(&mut self, frame: &Frame) -> (Side, f32) {
        match self.measure(frame) {
            Some(reading) => reading.classify(&self.config),
            None => (Side::None, 0.0),
        }
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }

    fn tally(&self, width: usize, prev: &[u8], cur: &[u8]) -> MotionReading {
        let mid = width / 2;
        let mut reading = MotionReading { left: 0, right: 0 };
        for (i, (a, b)) in prev.iter().zip(cur).enumerate() {
            if a.abs_diff(*b) > self.config.pixel_threshold {
                if i % width.max(1) < mid {
                    reading.left += 1;
                } else {
                    reading.right += 1;
                }
            }
        }
        reading
    }
}
