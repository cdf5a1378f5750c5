//! The pet's voice: text-to-speech on a worker thread.
//!
//! Lines go through a short queue to a [`Speaker`].  With the `voice`
//! feature and an API key, [`ElevenLabs`] fetches an mp3 and hands it to an
//! external player; otherwise, or whenever speech fails, the line is only
//! written to the log.
//!
//! | Call | Queue position |
//! |---|---|
//! | `say(text, false)` | back; dropped when the queue is full |
//! | `say(text, true)` | front; the newest queued line makes room |

use std::collections::VecDeque;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::VoiceConfig;

/// What `L` says.
pub const PHRASES: &[&str] = &["labu-labu", "labuubuulabuubuu", "six seven", "forty-one"];

/// Lines waiting beyond this are dropped.
pub const MAX_QUEUED: usize = 4;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("voice is disabled")]
    Disabled,
    #[error("speech request failed: {0}")]
    Http(String),
    #[error("audio file: {0}")]
    Io(#[from] std::io::Error),
    #[error("audio player: {0}")]
    Playback(String),
}

pub trait Speaker: Send {
    fn speak(&mut self, text: &str) -> Result<(), VoiceError>;

    fn name(&self) -> &'static str;
}

/// Text only.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSpeaker;

impl Speaker for ConsoleSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), VoiceError> {
        info!(target: "desktop_pet::voice", "(says) {text}");
        Ok(())
    }

    fn name(&self) -> &'static str { "console" }
}

// ════════════════════════════════════════════════════════════════════════════
// ElevenLabs
// ════════════════════════════════════════════════════════════════════════════

pub const API_BASE: &str = "https://api.elevenlabs.io/v1";

/// The player command for an mp3 file: the configured one split on
/// whitespace, or a platform default.
pub fn player_argv(configured: Option<&str>) -> Vec<String> {
    let cmd = configured
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(if cfg!(target_os = "macos") {
            "afplay"
        } else {
            "ffplay -nodisp -autoexit -loglevel quiet"
        });
    cmd.split_whitespace().map(str::to_string).collect()
}

#[cfg(feature = "voice")]
pub struct ElevenLabs {
    client: reqwest::blocking::Client,
    key:    String,
    config: VoiceConfig,
}

#[cfg(feature = "voice")]
impl ElevenLabs {
    pub fn new(key: &str, config: VoiceConfig) -> Result<Self, VoiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .map_err(|e| VoiceError::Http(e.to_string()))?;
        Ok(ElevenLabs { client, key: key.to_string(), config })
    }

    fn fetch(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let url = format!("{API_BASE}/text-to-speech/{}", self.config.voice_id);
        let body = serde_json::json!({
            "text": text,
            "model_id": self.config.model_id,
            "voice_settings": {
                "stability": self.config.stability,
                "similarity_boost": self.config.similarity_boost,
                "style": self.config.style,
                "use_speaker_boost": self.config.speaker_boost,
            },
        });
        let resp = self
            .client
            .post(url)
            .header("xi-api-key", &self.key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .map_err(|e| VoiceError::Http(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(VoiceError::Http(format!("status {status}")));
        }
        let bytes = resp.bytes().map_err(|e| VoiceError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn play(&self, audio: &[u8]) -> Result<(), VoiceError> {
        use std::io::Write;

        let mut file = tempfile::Builder::new().prefix("pet-voice-").suffix(".mp3").tempfile()?;
        file.write_all(audio)?;
        file.flush()?;

        let argv = player_argv(self.config.player.as_deref());
        let Some((program, args)) = argv.split_first() else {
            return Err(VoiceError::Playback("empty player command".into()));
        };
        let status = std::process::Command::new(program)
            .args(args)
            .arg(file.path())
            .status()
            .map_err(|e| VoiceError::Playback(format!("{program}: {e}")))?;
        if !status.success() {
            return Err(VoiceError::Playback(format!("{program} exited with {status}")));
        }
        Ok(())
    }
}

#[cfg(feature = "voice")]
impl Speaker for ElevenLabs {
    fn speak(&mut self, text: &str) -> Result<(), VoiceError> {
        let audio = self.fetch(text)?;
        debug!(bytes = audio.len(), "speech audio received");
        self.play(&audio)
    }

    fn name(&self) -> &'static str { "elevenlabs" }
}

/// The best speaker `cfg` allows.
pub fn make_speaker(cfg: &VoiceConfig) -> Box<dyn Speaker> {
    if !cfg.enabled {
        return Box::new(ConsoleSpeaker);
    }
    #[cfg(feature = "voice")]
    {
        if let Some(key) = cfg.usable_key() {
            match ElevenLabs::new(key, cfg.clone()) {
                Ok(s) => {
                    info!(voice = %cfg.voice_id, "ElevenLabs voice enabled");
                    return Box::new(s);
                }
                Err(e) => warn!(error = %e, "cannot set up ElevenLabs, text only"),
            }
        } else {
            info!("no ElevenLabs API key, voice is text only");
        }
    }
    #[cfg(not(feature = "voice"))]
    if cfg.usable_key().is_some() {
        info!("built without the `voice` feature, voice is text only");
    }
    Box::new(ConsoleSpeaker)
}

// ════════════════════════════════════════════════════════════════════════════
// SpeechQueue
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct SpeechQueue {
    lines: VecDeque<String>,
    cap:   usize,
}

impl SpeechQueue {
    pub fn new(cap: usize) -> Self {
        SpeechQueue { lines: VecDeque::new(), cap: cap.max(1) }
    }

    /// False when the line was dropped.
    pub fn push(&mut self, text: String, priority: bool) -> bool {
        if priority {
            if self.lines.len() >= self.cap {
                self.lines.pop_back();
            }
            self.lines.push_front(text);
            return true;
        }
        if self.lines.len() >= self.cap {
            return false;
        }
        self.lines.push_back(text);
        true
    }

    pub fn pop(&mut self) -> Option<String> { self.lines.pop_front() }
    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Voice: the speech worker
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
enum VoiceCommand {
    Say { text: String, priority: bool },
    Quit,
}

pub struct Voice {
    cmd_tx: Option<Sender<VoiceCommand>>,
    done:   Option<Receiver<()>>,
    handle: Option<JoinHandle<()>>,
    speaks_comments: bool,
}

impl Voice {
    /// How long [`Voice::quit`] waits for the line being spoken.
    pub const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn spawn(cfg: &VoiceConfig) -> Self {
        if !cfg.enabled {
            return Voice::silent();
        }
        Voice::spawn_with(make_speaker(cfg), MAX_QUEUED).with_comments(cfg.speak_comments)
    }

    pub fn spawn_with(speaker: Box<dyn Speaker>, cap: usize) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (done_tx, done) = bounded(1);
        let handle = thread::Builder::new()
            .name("pet-voice".into())
            .spawn(move || {
                voice_thread(speaker, cmd_rx, cap);
                let _ = done_tx.send(());
            });
        match handle {
            Ok(handle) => Voice {
                cmd_tx: Some(cmd_tx),
                done:   Some(done),
                handle: Some(handle),
                speaks_comments: false,
            },
            Err(e) => {
                warn!(error = %e, "cannot start voice thread");
                Voice::silent()
            }
        }
    }

    /// Speak ordinary comments too, not just `L` phrases.
    pub fn with_comments(mut self, on: bool) -> Self {
        self.speaks_comments = on;
        self
    }

    /// A voice that says nothing.
    pub fn silent() -> Self {
        Voice { cmd_tx: None, done: None, handle: None, speaks_comments: false }
    }

    pub fn is_enabled(&self) -> bool { self.cmd_tx.is_some() }

    /// Whether ordinary comments are spoken as well as `L` phrases.
    pub fn speaks_comments(&self) -> bool { self.speaks_comments }

    pub fn say(&self, text: &str, priority: bool) -> Result<(), VoiceError> {
        let tx = self.cmd_tx.as_ref().ok_or(VoiceError::Disabled)?;
        tx.send(VoiceCommand::Say { text: text.to_string(), priority })
            .map_err(|_| VoiceError::Disabled)
    }

    /// Finish the line being spoken, drop the rest, and join the thread,
    /// waiting at most [`Voice::QUIT_TIMEOUT`].
    pub fn quit(&mut self) {
        self.quit_within(Self::QUIT_TIMEOUT);
    }

    /// As [`Voice::quit`]; false when the thread was still busy after
    /// `timeout` and was detached.
    pub fn quit_within(&mut self, timeout: Duration) -> bool {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(VoiceCommand::Quit);
        }
        let (Some(handle), Some(done)) = (self.handle.take(), self.done.take()) else {
            return true;
        };
        match done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(?timeout, "voice thread still speaking, detaching");
                false
            }
        }
    }
}

impl Drop for Voice {
    fn drop(&mut self) { self.quit(); }
}

/// Queue a command; false on quit.
fn accept(queue: &mut SpeechQueue, cmd: VoiceCommand) -> bool {
    match cmd {
        VoiceCommand::Say { text, priority } => {
            if !queue.push(text, priority) {
                debug!("speech queue full, line dropped");
            }
            true
        }
        VoiceCommand::Quit => false,
    }
}

fn voice_thread(mut speaker: Box<dyn Speaker>, cmd_rx: Receiver<VoiceCommand>, cap: usize) {
    let mut queue = SpeechQueue::new(cap);
    let mut fallback = ConsoleSpeaker;
    loop {
        if queue.is_empty() {
            match cmd_rx.recv() {
                Ok(cmd) if accept(&mut queue, cmd.clone()) => {}
                _ => return,
            }
        }
        while let Ok(cmd) = cmd_rx.try_recv() {
            if !accept(&mut queue, cmd) {
                return;
            }
        }
        let Some(text) = queue.pop() else { continue };
        if let Err(e) = speaker.speak(&text) {
            warn!(speaker = speaker.name(), error = %e, "speech failed");
            let _ = fallback.speak(&text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        said:     Arc<Mutex<Vec<String>>>,
        fail_on:  Option<&'static str>,
    }

    impl Speaker for Recorder {
        fn speak(&mut self, text: &str) -> Result<(), VoiceError> {
            if self.fail_on == Some(text) {
                return Err(VoiceError::Playback("broken".into()));
            }
            self.said.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str { "recorder" }
    }

    #[test]
    fn priority_lines_jump_the_queue() {
        let mut q = SpeechQueue::new(3);
        assert!(q.push("a".into(), false));
        assert!(q.push("b".into(), false));
        assert!(q.push("urgent".into(), true));
        assert_eq!(q.pop().as_deref(), Some("urgent"));
        assert_eq!(q.pop().as_deref(), Some("a"));
    }

    #[test]
    fn full_queue_drops_ordinary_lines_but_not_priority_ones() {
        let mut q = SpeechQueue::new(2);
        q.push("a".into(), false);
        q.push("b".into(), false);
        assert!(!q.push("c".into(), false));
        assert!(q.push("now".into(), true));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().as_deref(), Some("now"));
        assert_eq!(q.pop().as_deref(), Some("a"));
        assert!(q.is_empty());
    }

    #[test]
    fn worker_speaks_lines_and_survives_failures() {
        let rec = Recorder { fail_on: Some("boom"), ..Recorder::default() };
        let said = rec.said.clone();
        let mut voice = Voice::spawn_with(Box::new(rec), 8);
        voice.say("boom", false).unwrap();
        voice.say("hello", false).unwrap();
        // Lines still queued when Quit arrives are dropped.
        std::thread::sleep(std::time::Duration::from_millis(100));
        voice.quit();
        assert_eq!(*said.lock().unwrap(), vec!["hello".to_string()]);
    }

    struct Stalled;

    impl Speaker for Stalled {
        fn speak(&mut self, _text: &str) -> Result<(), VoiceError> {
            std::thread::sleep(std::time::Duration::from_secs(2));
            Ok(())
        }

        fn name(&self) -> &'static str { "stalled" }
    }

    #[test]
    fn quit_does_not_wait_on_a_stalled_speaker() {
        let mut voice = Voice::spawn_with(Box::new(Stalled), 4);
        voice.say("hello", false).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        let t0 = std::time::Instant::now();
        assert!(!voice.quit_within(Duration::from_millis(50)));
        assert!(t0.elapsed() < Duration::from_secs(1));
        assert!(!voice.is_enabled());
    }

    #[test]
    fn idle_voice_quits_cleanly() {
        let mut voice = Voice::spawn_with(Box::new(ConsoleSpeaker), 4).with_comments(true);
        assert!(voice.speaks_comments());
        assert!(voice.quit_within(Duration::from_secs(1)));
        assert!(voice.quit_within(Duration::from_millis(1)));
    }

    #[test]
    fn silent_voice_reports_disabled() {
        let v = Voice::silent();
        assert!(!v.is_enabled());
        assert!(matches!(v.say("hi", false), Err(VoiceError::Disabled)));
        let off = Voice::spawn(&VoiceConfig { enabled: false, ..VoiceConfig::default() });
        assert!(!off.is_enabled());
    }

    #[test]
    fn player_command_defaults_and_overrides() {
        assert_eq!(player_argv(Some("mpg123 -q")), vec!["mpg123", "-q"]);
        assert!(!player_argv(None).is_empty());
        assert_eq!(player_argv(Some("  ")), player_argv(None));
    }

    #[test]
    fn phrases_are_the_catch_phrases() {
        assert!(PHRASES.contains(&"labu-labu"));
        assert!(PHRASES.contains(&"six seven"));
    }
}
