//! The webcam hand-alternation game.
//!
//! Wraps a [`GameSession`] around a [`CaptureWorker`].  The worker is
//! started with the game and stopped on every way out: win, loss, retry,
//! forced close, or drop.  If the camera cannot be opened (or dies) the game
//! keeps running in simulation mode, where SPACE credits an alternation.

use std::time::{Duration, Instant};

use gesture_count::{GameSession, SessionConfig, SessionResult, Side};
use pet_camera::{
    CameraOpener, CaptureConfig, CaptureStatus, CaptureWorker, DetectionMode, FrameGesture,
};
use tracing::{info, warn};

use crate::game::{GameInput, GameKind, MiniGame};

#[derive(Clone)]
pub struct HandConfig {
    pub opener:       CameraOpener,
    pub capture:      CaptureConfig,
    pub session:      SessionConfig,
    /// Bounded wait when stopping the capture thread.
    pub stop_timeout: Duration,
}

impl HandConfig {
    pub fn new(opener: CameraOpener) -> Self {
        HandConfig {
            opener,
            capture:      CaptureConfig::default(),
            session:      SessionConfig::default(),
            stop_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CameraState {
    /// Worker started, no word from it yet.
    Connecting,
    Live { mode: DetectionMode },
    /// No camera: SPACE simulates, C retries.
    Simulation { reason: String },
}

pub struct HandAlternator {
    config:     HandConfig,
    session:    Option<GameSession>,
    worker:     Option<CaptureWorker>,
    camera:     CameraState,
    last_frame: Option<FrameGesture>,
}

impl HandAlternator {
    pub fn new(config: HandConfig) -> Self {
        HandAlternator {
            config,
            session:    None,
            worker:     None,
            camera:     CameraState::Connecting,
            last_frame: None,
        }
    }

    pub fn camera_state(&self) -> &CameraState        { &self.camera }
    pub fn session(&self)      -> Option<&GameSession> { self.session.as_ref() }
    pub fn last_frame(&self)   -> Option<&FrameGesture> { self.last_frame.as_ref() }
    pub fn has_worker(&self)   -> bool                  { self.worker.is_some() }

    pub fn count(&self) -> u32 { self.session.as_ref().map_or(0, |s| s.count()) }

    pub fn target(&self) -> u32 {
        self.session.as_ref().map_or(self.config.session.target, |s| s.target())
    }

    /// The side the counter is currently tracking.
    pub fn current_side(&self) -> Side {
        self.session.as_ref().map_or(Side::None, |s| s.counter().state().side())
    }

    fn start_worker(&mut self) {
        self.stop_worker();
        self.camera = CameraState::Connecting;
        self.last_frame = None;
        self.worker = Some(CaptureWorker::spawn(self.config.opener.clone(), self.config.capture));
    }

    fn stop_worker(&mut self) {
        if let Some(mut w) = self.worker.take() {
            let outcome = w.stop(self.config.stop_timeout);
            info!(?outcome, "hand game released camera");
        }
    }

    fn poll_worker(&mut self) {
        let Some(worker) = &self.worker else { return };
        let mut failed = None;
        for status in worker.poll_status() {
            match status {
                CaptureStatus::Opened { index, api, mode } => {
                    info!(index, %api, %mode, "hand game camera live");
                    self.camera = CameraState::Live { mode };
                }
                CaptureStatus::Failed(e) => failed = Some(e),
            }
        }
        if let Some(frame) = worker.latest_frame() {
            if let Some(session) = self.session.as_mut() {
                session.observe(frame.sample());
            }
            self.last_frame = Some(frame);
        }
        if let Some(e) = failed {
            warn!(error = %e, "camera unavailable, switching to simulation");
            self.stop_worker();
            if let Some(session) = self.session.as_mut() {
                session.reset_hold();
            }
            self.camera = CameraState::Simulation { reason: e.to_string() };
        }
    }
}

impl MiniGame for HandAlternator {
    fn kind(&self) -> GameKind { GameKind::HandAlternator }

    fn start(&mut self, now: Instant) {
        self.session = Some(GameSession::new(self.config.session, now));
        self.start_worker();
    }

    fn tick(&mut self, now: Instant) {
        let Some(session) = &self.session else { return };
        if session.is_terminal() {
            return;
        }
        self.poll_worker();
        let done = self.session.as_mut().is_some_and(|s| s.tick(now).is_terminal());
        if done {
            self.stop_worker();
        }
    }

    fn handle_input(&mut self, input: GameInput, now: Instant) {
        let pending = self.session.as_ref().is_some_and(|s| !s.is_terminal());
        if !pending {
            return;
        }
        match input {
            GameInput::Simulate => {
                let done = self
                    .session
                    .as_mut()
                    .is_some_and(|s| s.simulate_alternation(now).is_terminal());
                if done {
                    self.stop_worker();
                }
            }
            GameInput::RetryCamera => {
                info!("retrying camera");
                if let Some(s) = self.session.as_mut() {
                    s.reset_hold();
                }
                self.start_worker();
            }
            GameInput::PointerMoved { .. } | GameInput::Click { .. } => {}
        }
    }

    fn end(&mut self) {
        self.stop_worker();
    }

    fn result(&self) -> SessionResult {
        self.session.as_ref().map_or(SessionResult::Pending, |s| s.result())
    }

    fn status_line(&self, now: Instant) -> String {
        let Some(s) = &self.session else { return "Get ready...".to_string() };
        match s.result() {
            SessionResult::Won  => format!("YOU WIN! {} alternations", s.count()),
            SessionResult::Lost => format!("Time's up! {}/{}", s.count(), s.target()),
            SessionResult::Pending => {
                let mode = match &self.camera {
                    CameraState::Connecting => "camera starting".to_string(),
                    CameraState::Live { mode } => format!("{mode} mode"),
                    CameraState::Simulation { .. } => "SIMULATION: SPACE to alternate, C to retry".to_string(),
                };
                format!("{}/{}  {}s  {}  {}",
                        s.count(), s.target(), s.remaining(now).as_secs(),
                        self.current_side().label(), mode)
            }
        }
    }

    fn detail(&self) -> String {
        format!("{}/{} alternations", self.count(), self.target())
    }
}

impl Drop for HandAlternator {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use pet_camera::CameraError;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn no_camera() -> HandConfig {
        let opener: CameraOpener = Arc::new(|| Err(CameraError::NoCameraFound { tried: 9 }));
        let mut cfg = HandConfig::new(opener);
        cfg.capture.frame_interval = ms(2);
        cfg
    }

    /// Tick until the worker reports, using real time for the thread but a
    /// fixed game clock.
    fn settle(g: &mut HandAlternator, at: Instant) {
        for _ in 0..200 {
            g.tick(at);
            if !matches!(g.camera_state(), CameraState::Connecting) {
                return;
            }
            thread::sleep(ms(5));
        }
    }

    #[test]
    fn missing_camera_falls_back_to_simulation() {
        let t0 = Instant::now();
        let mut g = HandAlternator::new(no_camera());
        g.start(t0);
        settle(&mut g, t0);
        assert!(matches!(g.camera_state(), CameraState::Simulation { .. }));
        assert!(!g.has_worker());
        assert!(g.status_line(t0).contains("SIMULATION"));
    }

    #[test]
    fn simulated_alternations_win() {
        let t0 = Instant::now();
        let mut g = HandAlternator::new(no_camera());
        g.start(t0);
        for i in 0..10 {
            assert_eq!(g.result(), SessionResult::Pending);
            g.handle_input(GameInput::Simulate, t0 + ms(100 * i));
        }
        assert_eq!(g.result(), SessionResult::Won);
        assert!(!g.has_worker());
        assert_eq!(g.detail(), "10/10 alternations");
    }

    #[test]
    fn no_input_loses_at_deadline() {
        let t0 = Instant::now();
        let mut g = HandAlternator::new(no_camera());
        g.start(t0);
        g.tick(t0 + ms(29_999));
        assert_eq!(g.result(), SessionResult::Pending);
        g.tick(t0 + ms(30_000));
        assert_eq!(g.result(), SessionResult::Lost);
        assert!(!g.has_worker());
    }

    #[test]
    fn retry_restarts_the_worker() {
        let t0 = Instant::now();
        let mut g = HandAlternator::new(no_camera());
        g.start(t0);
        settle(&mut g, t0);
        g.handle_input(GameInput::RetryCamera, t0 + ms(100));
        assert_eq!(g.camera_state(), &CameraState::Connecting);
        assert!(g.has_worker());
        g.end();
        assert!(!g.has_worker());
    }

    #[test]
    fn input_after_result_is_ignored() {
        let t0 = Instant::now();
        let mut g = HandAlternator::new(no_camera());
        g.start(t0);
        g.tick(t0 + ms(30_000));
        g.handle_input(GameInput::RetryCamera, t0 + ms(30_001));
        assert!(!g.has_worker());
        assert_eq!(g.result(), SessionResult::Lost);
    }
}
