//! OpenCV `VideoCapture` backend (feature = "camera").

use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use tracing::debug;

use crate::camera::{CameraApi, CameraBackend, CameraError, FrameSource};
use crate::frame::Frame;

fn backend_err(e: opencv::Error) -> CameraError {
    CameraError::Backend(e.to_string())
}

fn api_code(api: CameraApi) -> i32 {
    match api {
        CameraApi::Any        => videoio::CAP_ANY,
        CameraApi::DirectShow => videoio::CAP_DSHOW,
        CameraApi::V4l2       => videoio::CAP_V4L2,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OpenCvBackend;

impl CameraBackend for OpenCvBackend {
    fn open(&self, index: i32, api: CameraApi) -> Result<Box<dyn FrameSource>, CameraError> {
        let mut cap = VideoCapture::new(index, api_code(api)).map_err(backend_err)?;
        if !cap.is_opened().map_err(backend_err)? {
            return Err(CameraError::Open { index, api, reason: "device did not open".into() });
        }
        // Best effort: not every driver honours these.
        for (prop, value) in [
            (videoio::CAP_PROP_FRAME_WIDTH, 640.0),
            (videoio::CAP_PROP_FRAME_HEIGHT, 480.0),
            (videoio::CAP_PROP_FPS, 30.0),
            (videoio::CAP_PROP_BUFFERSIZE, 1.0),
        ] {
            if let Err(e) = cap.set(prop, value) {
                debug!(prop, error = %e, "capture property not set");
            }
        }
        Ok(Box::new(OpenCvSource { cap }))
    }

    fn name(&self) -> &'static str { "opencv" }
}

struct OpenCvSource {
    cap: VideoCapture,
}

impl FrameSource for OpenCvSource {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        let mut bgr = Mat::default();
        if !self.cap.read(&mut bgr).map_err(backend_err)? {
            return Err(CameraError::Capture("no frame".into()));
        }
        let size = bgr.size().map_err(backend_err)?;
        if size.width <= 0 || size.height <= 0 {
            return Err(CameraError::Capture("empty frame".into()));
        }
        let mut rgb = Mat::default();
        imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(backend_err)?;
        let bytes = rgb.data_bytes().map_err(backend_err)?.to_vec();
        Ok(Frame::from_rgb(size.width as usize, size.height as usize, bytes))
    }
}

impl Drop for OpenCvSource {
    fn drop(&mut self) {
        if let Err(e) = self.cap.release() {
            debug!(error = %e, "camera release failed");
        }
    }
}
