//! Little MIDI jingles for game events, played on their own thread.
//!
//! The first available MIDI output port is used (a soft-synth if one is
//! visible).  Without one the jingles go to a null output and the pet
//! carries on silently.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AudioConfig;

// ════════════════════════════════════════════════════════════════════════════
// Jingles
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Jingle {
    /// Rising arpeggio.
    Win,
    /// Falling minor third steps.
    Lose,
    /// Two quick chirps.
    Request,
    Launch,
}

impl Jingle {
    /// `(MIDI note, milliseconds)` pairs.
    pub fn notes(self) -> &'static [(u8, u64)] {
        match self {
            Jingle::Win     => &[(60, 110), (64, 110), (67, 110), (72, 260)],
            Jingle::Lose    => &[(67, 180), (63, 180), (60, 180), (55, 380)],
            Jingle::Request => &[(79, 70), (84, 90)],
            Jingle::Launch  => &[(72, 90), (76, 90), (79, 140)],
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut: where jingles are sent
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program & 0x7F]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note & 0x7F, 0]);
    }
}

pub struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)  {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8)        {}
}

/// Open the first MIDI output port, preferring a soft-synth.  Falls back to
/// [`NullOut`].
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("desktop_pet") {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed, jingles disabled");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        info!("no MIDI output ports, jingles disabled");
        return Box::new(NullOut);
    }

    let port_idx = ports
        .iter()
        .position(|p| {
            midi_out.port_name(p).is_ok_and(|n| {
                let n = n.to_lowercase();
                ["fluid", "timidity", "microsoft", "gm", "synth"].iter().any(|s| n.contains(s))
            })
        })
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "unknown".to_string());
    match midi_out.connect(port, "desktop-pet-chime") {
        Ok(conn) => {
            info!(port = %name, "MIDI output opened");
            Box::new(MidirOut { conn })
        }
        Err(e) => {
            warn!(port = %name, error = %e, "MIDI connect failed, jingles disabled");
            Box::new(NullOut)
        }
    }
}

/// Play one jingle, sleeping through each note with `sleep`.
pub fn play_jingle<S: FnMut(Duration)>(
    out:      &mut dyn MidiOut,
    jingle:   Jingle,
    channel:  u8,
    velocity: u8,
    mut sleep: S,
) {
    for &(note, ms) in jingle.notes() {
        out.note_on(channel, note, velocity);
        sleep(Duration::from_millis(ms));
        out.note_off(channel, note);
        sleep(Duration::from_millis((ms / 20).max(5)));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Chime: the jingle thread
// ════════════════════════════════════════════════════════════════════════════

enum ChimeCommand {
    Play(Jingle),
    Quit,
}

pub struct Chime {
    cmd_tx: Option<Sender<ChimeCommand>>,
    done:   Option<Receiver<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Chime {
    /// How long [`Chime::quit`] waits for the current jingle.
    pub const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Spawn the playback thread on the system's MIDI output, or a silent
    /// chime when audio is disabled.
    pub fn spawn(cfg: &AudioConfig) -> Self {
        if !cfg.enabled {
            return Chime::silent();
        }
        let cfg = cfg.clone();
        Self::spawn_with(open_midi_output, cfg)
    }

    /// Spawn with a specific output; the opener runs on the playback thread.
    pub fn spawn_with<F>(open: F, cfg: AudioConfig) -> Self
    where
        F: FnOnce() -> Box<dyn MidiOut> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ChimeCommand>();
        let (done_tx, done) = mpsc::sync_channel::<()>(1);
        let handle = thread::Builder::new()
            .name("pet-chime".into())
            .spawn(move || {
                chime_thread(open(), cfg, cmd_rx);
                let _ = done_tx.send(());
            });
        match handle {
            Ok(handle) => Chime { cmd_tx: Some(cmd_tx), done: Some(done), handle: Some(handle) },
            Err(e) => {
                warn!(error = %e, "cannot start chime thread");
                Chime::silent()
            }
        }
    }

    pub fn silent() -> Self { Chime { cmd_tx: None, done: None, handle: None } }

    pub fn play(&self, jingle: Jingle) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(ChimeCommand::Play(jingle));
        }
    }

    /// Stop after the current jingle and wait for the thread, at most
    /// [`Chime::QUIT_TIMEOUT`].
    pub fn quit(&mut self) {
        self.quit_within(Self::QUIT_TIMEOUT);
    }

    /// False when the thread was detached after `timeout`.
    pub fn quit_within(&mut self, timeout: Duration) -> bool {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(ChimeCommand::Quit);
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
                warn!(?timeout, "chime thread still playing, detaching");
                false
            }
        }
    }
}

impl Drop for Chime {
    fn drop(&mut self) { self.quit(); }
}

fn chime_thread(mut midi: Box<dyn MidiOut>, cfg: AudioConfig, cmd_rx: Receiver<ChimeCommand>) {
    midi.program_change(cfg.channel, cfg.program);
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            ChimeCommand::Play(j) => {
                debug!(jingle = ?j, "chime");
                play_jingle(midi.as_mut(), j, cfg.channel, cfg.velocity, thread::sleep);
            }
            ChimeCommand::Quit => return,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(char, u8)>>>);

    impl MidiOut for Recorder {
        fn program_change(&mut self, _ch: u8, p: u8) { self.0.lock().unwrap().push(('p', p)); }
        fn note_on(&mut self, _ch: u8, n: u8, _v: u8) { self.0.lock().unwrap().push(('+', n)); }
        fn note_off(&mut self, _ch: u8, n: u8)        { self.0.lock().unwrap().push(('-', n)); }
    }

    #[test]
    fn every_note_is_released() {
        let mut rec = Recorder::default();
        play_jingle(&mut rec, Jingle::Win, 0, 100, |_| {});
        let events = rec.0.lock().unwrap().clone();
        assert_eq!(events.len(), Jingle::Win.notes().len() * 2);
        for pair in events.chunks(2) {
            assert_eq!((pair[0].0, pair[1].0), ('+', '-'));
            assert_eq!(pair[0].1, pair[1].1);
        }
    }

    #[test]
    fn win_rises_and_lose_falls() {
        let rising = |j: Jingle| j.notes().windows(2).all(|w| w[1].0 > w[0].0);
        let falling = |j: Jingle| j.notes().windows(2).all(|w| w[1].0 < w[0].0);
        assert!(rising(Jingle::Win));
        assert!(falling(Jingle::Lose));
    }

    #[test]
    fn thread_plays_then_quits() {
        let rec = Recorder::default();
        let seen = rec.clone();
        let mut chime = Chime::spawn_with(move || Box::new(rec) as Box<dyn MidiOut>, AudioConfig { program: 11, ..AudioConfig::default() });
        chime.play(Jingle::Request);
        chime.quit();
        let events = seen.0.lock().unwrap().clone();
        assert_eq!(events[0], ('p', 11));
        assert_eq!(events.len(), 1 + Jingle::Request.notes().len() * 2);
    }

    struct Stuck;

    impl MidiOut for Stuck {
        fn program_change(&mut self, _ch: u8, _p: u8) { thread::sleep(Duration::from_secs(2)); }
        fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
        fn note_off(&mut self, _ch: u8, _n: u8) {}
    }

    #[test]
    fn quit_gives_up_on_a_stuck_output() {
        let mut chime = Chime::spawn_with(|| Box::new(Stuck) as Box<dyn MidiOut>, AudioConfig::default());
        let t0 = std::time::Instant::now();
        assert!(!chime.quit_within(Duration::from_millis(50)));
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn silent_chime_ignores_everything() {
        let mut c = Chime::silent();
        c.play(Jingle::Win);
        c.quit();
        let mut off = Chime::spawn(&AudioConfig { enabled: false, ..AudioConfig::default() });
        off.play(Jingle::Lose);
        off.quit();
    }
}
