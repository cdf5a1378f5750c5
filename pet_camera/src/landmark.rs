//! Hand-landmark based detection.
//!
//! No landmark model ships with this crate.  Anything that can locate the
//! two wrists in a frame (a pose-estimation binding, a remote service, a
//! test double) plugs in through [`LandmarkDetector`].
//!
//! This is a library extension point: the `desktop_pet` binary's camera
//! opener never attaches one, so it always runs motion detection.  An
//! embedder that has a detector supplies its own opener:
//!
//! ```ignore
//! let opener: CameraOpener = Arc::new(|| {
//!     open_camera(default_backend().as_ref(), 0)
//!         .map(|cam| cam.with_landmarks(Box::new(MyWrists::new())))
//! });
//! desktop_pet::app::run(config, opener)?;
//! ```

use gesture_count::Side;

use crate::camera::CameraError;
use crate::frame::Frame;

/// A wrist must sit at least this far (in normalised image height) above the
/// other to count as raised.
pub const WRIST_MARGIN: f32 = 0.05;

/// Wrist positions in normalised image coordinates, `y` growing downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandLandmarks {
    pub left_wrist_y:  Option<f32>,
    pub right_wrist_y: Option<f32>,
    /// Detector confidence for this frame, 0.0–1.0.
    pub confidence:    f32,
}

impl HandLandmarks {
    /// The raised side.  Both wrists must be visible.
    pub fn classify(&self) -> (Side, f32) {
        let (Some(l), Some(r)) = (self.left_wrist_y, self.right_wrist_y) else {
            return (Side::None, 0.0);
        };
        if l < r - WRIST_MARGIN {
            (Side::Left, self.confidence)
        } else if r < l - WRIST_MARGIN {
            (Side::Right, self.confidence)
        } else {
            (Side::None, 0.0)
        }
    }
}

pub trait LandmarkDetector: Send {
    /// Locate the wrists in a mirrored frame.  An `Err` means the detector
    /// is unusable; the caller switches to motion detection for good.
    fn landmarks(&mut self, frame: &Frame) -> Result<HandLandmarks, CameraError>;

    fn name(&self) -> &str { "landmarks" }
}
