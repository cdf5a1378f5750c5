//! Detector selection and the per-frame result.

use std::fmt;
use std::time::Instant;

use gesture_count::{GestureSample, Side};
use tracing::warn;

use crate::frame::Frame;
use crate::landmark::LandmarkDetector;
use crate::motion::MotionDetector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectionMode {
    Landmarks,
    Motion,
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DetectionMode::Landmarks => "landmarks",
            DetectionMode::Motion    => "motion",
        })
    }
}

/// One analysed frame, ready for the UI thread.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameGesture {
    pub side:       Side,
    pub confidence: f32,
    pub at:         Instant,
    pub mode:       DetectionMode,
    /// Mirrored preview of the frame this reading came from.
    pub preview:    Option<Frame>,
}

impl FrameGesture {
    pub fn sample(&self) -> GestureSample {
        GestureSample::new(self.side, self.confidence, self.at)
    }
}

pub enum Detector {
    Landmarks(Box<dyn LandmarkDetector>),
    Motion(MotionDetector),
}

impl Detector {
    /// Prefer landmarks when available.
    pub fn select(landmarks: Option<Box<dyn LandmarkDetector>>) -> Self {
        match landmarks {
            Some(d) => Detector::Landmarks(d),
            None => Detector::Motion(MotionDetector::default()),
        }
    }

    pub fn mode(&self) -> DetectionMode {
        match self {
            Detector::Landmarks(_) => DetectionMode::Landmarks,
            Detector::Motion(_) => DetectionMode::Motion,
        }
    }

    /// Classify one mirrored frame.  A failing landmark detector is replaced
    /// by motion detection; this frame then reports `None`.
    pub fn detect(&mut self, frame: &Frame) -> (Side, f32) {
        match self {
            Detector::Motion(m) => m.detect(frame),
            Detector::Landmarks(d) => match d.landmarks(frame) {
                Ok(lm) => lm.classify(),
                Err(e) => {
                    warn!(detector = d.name(), error = %e, "landmark detector failed, using motion");
                    let mut motion = MotionDetector::default();
                    motion.detect(frame);
                    *self = Detector::Motion(motion);
                    (Side::None, 0.0)
                }
            },
        }
    }
}

impl Default for Detector {
    fn default() -> Self { Detector::Motion(MotionDetector::default()) }
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Detector({})", self.mode())
    }
}
