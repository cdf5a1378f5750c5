//! Background capture thread.
//!
//! The worker opens the camera *on its own thread* (probing can take a
//! second or two), then loops: read → detect → post to the mailbox.  The UI
//! thread only ever calls non-blocking methods plus [`CaptureWorker::stop`],
//! which waits a bounded time for the device to be released.
//!
//! ```text
//!  UI thread                       capture thread
//!  ─────────                       ──────────────
//!  spawn(opener) ───────────────▶  opener() → CameraHandle | error
//!  poll_status()   ◀── status ──   Opened / Failed
//!  latest_frame()  ◀── mailbox ─   next_frame() every frame_interval
//!  stop(timeout) ── stop flag ──▶  loop exits, handle dropped
//!                  ◀── done ────
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::camera::{CameraApi, CameraError, CameraHandle};
use crate::detector::{DetectionMode, FrameGesture};
use crate::mailbox::{mailbox, MailboxReceiver, MailboxSender};

/// Opens a camera.  Called once, on the capture thread.
pub type CameraOpener = Arc<dyn Fn() -> Result<CameraHandle, CameraError> + Send + Sync>;

// ════════════════════════════════════════════════════════════════════════════
// Configuration and status
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Pause between frames (~30 fps).
    pub frame_interval:    Duration,
    /// Consecutive read failures before the worker gives up.
    pub max_read_failures: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig { frame_interval: Duration::from_millis(33), max_read_failures: 30 }
    }
}

/// Lifecycle notifications from the capture thread.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureStatus {
    Opened { index: i32, api: CameraApi, mode: DetectionMode },
    /// The camera could not be opened, or stopped delivering frames.
    Failed(CameraError),
}

/// How [`CaptureWorker::stop`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// The thread finished and the device was released.
    Released,
    /// The thread did not finish in time and was detached.
    TimedOut,
    AlreadyStopped,
}

// ════════════════════════════════════════════════════════════════════════════
// CaptureWorker
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the capture thread.  Dropping it stops the thread.
pub struct CaptureWorker {
    stop:   Arc<AtomicBool>,
    frames: MailboxReceiver<FrameGesture>,
    status: Receiver<CaptureStatus>,
    done:   Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    /// How long [`Drop`] waits for the thread.
    pub const DROP_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn spawn(opener: CameraOpener, config: CaptureConfig) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let (frame_tx, frames) = mailbox();
        let (status_tx, status) = unbounded();
        let (done_tx, done) = bounded(1);

        let flag = stop.clone();
        let handle = thread::Builder::new()
            .name("pet-capture".into())
            .spawn(move || {
                capture_thread(opener, config, &flag, &frame_tx, &status_tx);
                let _ = done_tx.send(());
            });

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                warn!(error = %e, "could not spawn capture thread");
                None
            }
        };

        CaptureWorker { stop, frames, status, done, handle }
    }

    /// Newest analysed frame since the last call, if any.
    pub fn latest_frame(&self) -> Option<FrameGesture> {
        self.frames.take()
    }

    /// Drain pending status notifications.
    pub fn poll_status(&self) -> Vec<CaptureStatus> {
        self.status.try_iter().collect()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the thread to stop and wait up to `timeout` for it to release
    /// the camera.  A thread that does not answer in time is detached.
    pub fn stop(&mut self, timeout: Duration) -> StopOutcome {
        self.stop.store(true, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return StopOutcome::AlreadyStopped;
        };

        match self.done.recv_timeout(timeout) {
            // Disconnected: the thread panicked after dropping its sender.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                self.frames.clear();
                debug!("capture thread stopped");
                StopOutcome::Released
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(?timeout, "capture thread did not stop in time, detaching");
                StopOutcome::TimedOut
            }
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.stop(Self::DROP_TIMEOUT);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// capture_thread: the capture loop
// ════════════════════════════════════════════════════════════════════════════

fn capture_thread(
    opener:    CameraOpener,
    config:    CaptureConfig,
    stop:      &AtomicBool,
    frames:    &MailboxSender<FrameGesture>,
    status:    &Sender<CaptureStatus>,
) {
    let mut camera = match opener() {
        Ok(c) => c,
        Err(e) => {
            info!(error = %e, "camera unavailable");
            let _ = status.send(CaptureStatus::Failed(e));
            return;
        }
    };
    let _ = status.send(CaptureStatus::Opened {
        index: camera.index(),
        api:   camera.api(),
        mode:  camera.mode(),
    });

    let mut failures = 0;
    while !stop.load(Ordering::SeqCst) {
        match camera.next_frame() {
            Ok(g) => {
                failures = 0;
                frames.post(g);
            }
            Err(e) => {
                failures += 1;
                debug!(failures, error = %e, "frame read failed");
                if failures >= config.max_read_failures {
                    warn!(error = %e, "camera stopped delivering frames");
                    drop(camera);
                    let _ = status.send(CaptureStatus::Failed(e));
                    return;
                }
            }
        }
        thread::sleep(config.frame_interval);
    }
    // Release the device before signalling done.
    drop(camera);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
