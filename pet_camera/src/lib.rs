//! # pet_camera
//!
//! The camera side of the hand-alternation game.
//!
//! A [`CameraBackend`] is probed over a short list of device indices and
//! capture APIs by [`open_camera`]; the first device that actually yields a
//! frame becomes a [`CameraHandle`].  Each call to
//! [`CameraHandle::next_frame`] reads one frame, mirrors it so the player's
//! left is on the left, and runs it through a [`Detector`]:
//!
//! | Detector | When | Output |
//! |---|---|---|
//! | [`Detector::Landmarks`] | a [`LandmarkDetector`] was supplied and keeps working | higher wrist wins |
//! | [`Detector::Motion`] | otherwise | half of the frame with more pixel change wins |
//!
//! [`CaptureWorker`] runs that loop on its own thread and hands the newest
//! [`FrameGesture`] to the UI through a single-slot [`mailbox`]; older frames
//! are overwritten, never queued.
//!
//! ## Feature flags
//!
//! * (default): no capture backend; [`default_backend`] always reports
//!   [`CameraError::Unavailable`] and callers fall back to simulation.
//! * `camera`: OpenCV `VideoCapture` backend.

pub mod frame;
pub mod motion;
pub mod landmark;
pub mod detector;
pub mod camera;
pub mod mailbox;
pub mod worker;

#[cfg(feature = "camera")]
pub mod opencv_backend;

pub use frame::Frame;
pub use motion::{MotionConfig, MotionDetector, MotionReading};
pub use landmark::{HandLandmarks, LandmarkDetector};
pub use detector::{DetectionMode, Detector, FrameGesture};
pub use camera::{
    default_backend, open_camera, CameraApi, CameraBackend, CameraError, CameraHandle,
    FrameSource, NullBackend,
};
pub use mailbox::{mailbox, MailboxReceiver, MailboxSender};
pub use worker::{CameraOpener, CaptureConfig, CaptureStatus, CaptureWorker, StopOutcome};
