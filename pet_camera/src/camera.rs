//! Camera probing and the open device handle.

use std::fmt;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use crate::detector::{DetectionMode, Detector, FrameGesture};
use crate::frame::Frame;
use crate::landmark::LandmarkDetector;

/// Width of the preview attached to each [`FrameGesture`], in pixels.
const PREVIEW_WIDTH: usize = 160;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CameraError {
    #[error("no working camera found ({tried} device/API combinations tried)")]
    NoCameraFound { tried: usize },

    #[error("camera {index} via {api} could not be opened: {reason}")]
    Open { index: i32, api: CameraApi, reason: String },

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("camera support not compiled in (build with the `camera` feature)")]
    Unavailable,

    #[error("camera backend error: {0}")]
    Backend(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Capture APIs and backends
// ════════════════════════════════════════════════════════════════════════════

/// Platform capture API to request when opening a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraApi {
    Any,
    DirectShow,
    V4l2,
}

impl CameraApi {
    /// Order in which APIs are tried for each device index.
    pub const PROBE_ORDER: [CameraApi; 3] = [CameraApi::Any, CameraApi::DirectShow, CameraApi::V4l2];
}

impl fmt::Display for CameraApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CameraApi::Any        => "any",
            CameraApi::DirectShow => "DirectShow",
            CameraApi::V4l2       => "V4L2",
        })
    }
}

/// An open capture device.  Dropping it releases the device.
pub trait FrameSource: Send {
    fn read_frame(&mut self) -> Result<Frame, CameraError>;
}

/// Something that can open capture devices.
pub trait CameraBackend: Send + Sync {
    fn open(&self, index: i32, api: CameraApi) -> Result<Box<dyn FrameSource>, CameraError>;

    fn name(&self) -> &'static str;
}

/// Backend used when no capture support is compiled in.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBackend;

impl CameraBackend for NullBackend {
    fn open(&self, _index: i32, _api: CameraApi) -> Result<Box<dyn FrameSource>, CameraError> {
        Err(CameraError::Unavailable)
    }

    fn name(&self) -> &'static str { "none" }
}

/// The backend selected by feature flags.
pub fn default_backend() -> Box<dyn CameraBackend> {
    #[cfg(feature = "camera")]
    {
        Box::new(crate::opencv_backend::OpenCvBackend)
    }
    #[cfg(not(feature = "camera"))]
    {
        Box::new(NullBackend)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Probing
// ════════════════════════════════════════════════════════════════════════════

/// `preferred` first, then 0, 1, 2 without repeats.
fn candidate_indices(preferred: i32) -> Vec<i32> {
    let mut out = vec![preferred];
    for i in 0..3 {
        if !out.contains(&i) {
            out.push(i);
        }
    }
    out
}

/// Try each device index with each capture API until one opens *and*
/// delivers a frame.  Devices that open but cannot read are released
/// before moving on.
pub fn open_camera(backend: &dyn CameraBackend, preferred: i32) -> Result<CameraHandle, CameraError> {
    let mut tried = 0;
    for index in candidate_indices(preferred) {
        for api in CameraApi::PROBE_ORDER {
            tried += 1;
            let mut source = match backend.open(index, api) {
                Ok(source) => source,
                Err(CameraError::Unavailable) => return Err(CameraError::Unavailable),
                Err(e) => {
                    debug!(index, %api, error = %e, "camera open failed");
                    continue;
                }
            };
            match source.read_frame() {
                Ok(frame) if !frame.is_empty() => {
                    info!(backend = backend.name(), index, %api,
                          width = frame.width(), height = frame.height(), "camera opened");
                    return Ok(CameraHandle::new(source, index, api));
                }
                Ok(_) => debug!(index, %api, "camera returned an empty test frame"),
                Err(e) => debug!(index, %api, error = %e, "camera test read failed"),
            }
        }
    }
    Err(CameraError::NoCameraFound { tried })
}

// ════════════════════════════════════════════════════════════════════════════
// CameraHandle
// ════════════════════════════════════════════════════════════════════════════

/// An opened device plus the detector that interprets its frames.
pub struct CameraHandle {
    source:   Box<dyn FrameSource>,
    detector: Detector,
    index:    i32,
    api:      CameraApi,
}

impl CameraHandle {
    pub fn new(source: Box<dyn FrameSource>, index: i32, api: CameraApi) -> Self {
        CameraHandle { source, detector: Detector::default(), index, api }
    }

    /// Use a landmark detector instead of motion detection.
    pub fn with_landmarks(mut self, landmarks: Box<dyn LandmarkDetector>) -> Self {
        self.detector = Detector::Landmarks(landmarks);
        self
    }

    pub fn index(&self) -> i32             { self.index }
    pub fn api(&self)   -> CameraApi       { self.api }
    pub fn mode(&self)  -> DetectionMode   { self.detector.mode() }

    /// Read, mirror and classify one frame.
    pub fn next_frame(&mut self) -> Result<FrameGesture, CameraError> {
        let raw = self.source.read_frame()?;
        if raw.is_empty() {
            return Err(CameraError::Capture("empty frame".into()));
        }
        let at = Instant::now();
        let frame = raw.mirrored();
        let (side, confidence) = self.detector.detect(&frame);
        let step = (frame.width() / PREVIEW_WIDTH).max(1);
        Ok(FrameGesture {
            side,
            confidence,
            at,
            mode: self.detector.mode(),
            preview: Some(frame.downsample(step)),
        })
    }
}

impl fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraHandle")
            .field("index", &self.index)
            .field("api", &self.api)
            .field("detector", &self.detector)
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
