//! Pet configuration.
//!
//! Layered, lowest to highest precedence:
//!
//! | Layer | Source |
//! |---|---|
//! | built-in | `Default` impls below |
//! | file | optional TOML file given with `--config` |
//! | environment | `.env` (via `dotenvy`) and process env: `ELEVENLABS_*`, `PET_AUDIO_PLAYER` |
//! | command line | [`Cli`] flags |
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! changes:
//!
//! ```toml
//! [window]
//! screen_width  = 2560
//! screen_height = 1440
//!
//! [mood]
//! start = 0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// Voice id used when `ELEVENLABS_VOICE_ID` is unset.
pub const DEFAULT_VOICE_ID: &str = "EXAVITQu4vr4xnSDxMaL";
pub const DEFAULT_MODEL_ID: &str = "eleven_monolingual_v1";
/// The value shipped in the sample `.env`; treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Side of the square pet window, in pixels.
    pub pet_size:      usize,
    /// minifb cannot query the desktop size, so it is configured.
    pub screen_width:  usize,
    pub screen_height: usize,
    /// Animation tick.
    pub tick_ms:       u64,
    pub game_width:    usize,
    pub game_height:   usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            pet_size:      64,
            screen_width:  1920,
            screen_height: 1080,
            tick_ms:       16,
            game_width:    800,
            game_height:   600,
        }
    }
}

impl WindowConfig {
    pub fn tick(&self) -> Duration { Duration::from_millis(self.tick_ms.max(1)) }
}

/// Annoyance range, deltas and tier thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub start:         i32,
    pub floor:         i32,
    pub ceiling:       i32,
    pub won_delta:     i32,
    pub lost_delta:    i32,
    /// Key `A`.
    pub raise_delta:   i32,
    /// Key `S`.
    pub lower_delta:   i32,
    /// Key `N` on a game request.
    pub deny_delta:    i32,
    pub neutral_at:    i32,
    pub aggressive_at: i32,
    pub chaos_at:      i32,
}

impl Default for MoodConfig {
    fn default() -> Self {
        MoodConfig {
            start:         2,
            floor:         0,
            ceiling:       20,
            won_delta:     3,
            lost_delta:    3,
            raise_delta:   2,
            lower_delta:   3,
            deny_delta:    1,
            neutral_at:    2,
            aggressive_at: 6,
            chaos_at:      12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    /// Share of the remaining distance covered per tick.
    pub fraction:       f32,
    /// Per-tick step cap, in pixels.
    pub max_step:       f32,
    /// Pointer drift tolerated while locked before it is pulled back.
    pub lock_tolerance: f32,
    /// Ticks taken to drag the pointer to the top of the screen.
    pub grab_ticks:     u32,
    /// Distance at which a stalking pet has "reached" the pointer.
    pub reach:          f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        FollowConfig {
            fraction:       0.15,
            max_step:       12.0,
            lock_tolerance: 2.0,
            grab_ticks:     120,
            reach:          30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub walk_speed:         f32,
    pub gravity:            f32,
    pub bounce_damping:     f32,
    pub max_speed:          f32,
    pub mischief_max_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            walk_speed:         1.5,
            gravity:            0.3,
            bounce_damping:     0.6,
            max_speed:          2.0,
            mischief_max_speed: 4.0,
        }
    }
}

/// Game craving, request flow and idle animation timing.  Durations that the
/// pet counts in animation ticks are given in ticks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub craving_per_tick:      f32,
    pub craving_threshold:     f32,
    /// Per-tick chance of an automatic request once craving is high enough.
    pub request_chance:        f64,
    pub request_cooldown_secs: u64,
    pub auto_request_ticks:    u32,
    pub manual_request_ticks:  u32,
    pub blink_every:           u32,
    pub blink_ticks:           u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            craving_per_tick:      0.05,
            craving_threshold:     1.0,
            request_chance:        0.01,
            request_cooldown_secs: 10,
            auto_request_ticks:    180,
            manual_request_ticks:  300,
            blink_every:           120,
            blink_ticks:           5,
        }
    }
}

impl BehaviorConfig {
    pub fn request_cooldown(&self) -> Duration { Duration::from_secs(self.request_cooldown_secs) }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Tried first; 0, 1, 2 follow.
    pub preferred_index:   u32,
    pub frame_interval_ms: u64,
    pub max_read_failures: u32,
    pub stop_timeout_ms:   u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            preferred_index:   0,
            frame_interval_ms: 33,
            max_read_failures: 30,
            stop_timeout_ms:   2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled:          bool,
    /// Usually supplied through `ELEVENLABS_API_KEY` rather than the file.
    pub api_key:          Option<String>,
    pub voice_id:         String,
    pub model_id:         String,
    pub stability:        f32,
    pub similarity_boost: f32,
    pub style:            f32,
    pub speaker_boost:    bool,
    /// Command that plays an mp3 file given as its last argument.
    pub player:           Option<String>,
    /// Also speak the pet's comments, not just `L` phrases.
    pub speak_comments:   bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        VoiceConfig {
            enabled:          true,
            api_key:          None,
            voice_id:         DEFAULT_VOICE_ID.to_string(),
            model_id:         DEFAULT_MODEL_ID.to_string(),
            stability:        0.5,
            similarity_boost: 0.8,
            style:            0.3,
            speaker_boost:    true,
            player:           None,
            speak_comments:   false,
        }
    }
}

impl VoiceConfig {
    /// The API key if one is usable.
    pub fn usable_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled:  bool,
    /// General MIDI program for the jingles.
    pub program:  u8,
    pub channel:  u8,
    pub velocity: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig { enabled: true, program: 11, channel: 0, velocity: 96 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PetConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PetConfig {
    pub window:   WindowConfig,
    pub mood:     MoodConfig,
    pub follow:   FollowConfig,
    pub physics:  PhysicsConfig,
    pub behavior: BehaviorConfig,
    pub camera:   CameraConfig,
    pub voice:    VoiceConfig,
    pub audio:    AudioConfig,
    /// Seed for the pet's RNG; random when absent.
    pub seed:     Option<u64>,
}

impl PetConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Defaults, overlaid with `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else { return Ok(PetConfig::default()) };
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        if text.trim().is_empty() {
            return Ok(PetConfig::default());
        }
        Self::from_toml(&text, path)
    }

    /// Apply `ELEVENLABS_*` and `PET_AUDIO_PLAYER` using `lookup`
    /// (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ELEVENLABS_API_KEY") {
            self.voice.api_key = Some(key);
        }
        if let Some(id) = lookup("ELEVENLABS_VOICE_ID").filter(|v| !v.trim().is_empty()) {
            self.voice.voice_id = id;
        }
        if let Some(id) = lookup("ELEVENLABS_MODEL_ID").filter(|v| !v.trim().is_empty()) {
            self.voice.model_id = id;
        }
        if let Some(cmd) = lookup("PET_AUDIO_PLAYER").filter(|v| !v.trim().is_empty()) {
            self.voice.player = Some(cmd);
        }
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(index) = cli.camera {
            self.camera.preferred_index = index;
        }
        if let Some(ms) = cli.tick_ms {
            self.window.tick_ms = ms;
        }
        if let Some((w, h)) = cli.screen {
            self.window.screen_width = w;
            self.window.screen_height = h;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if cli.silent {
            self.voice.enabled = false;
            self.audio.enabled = false;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Command line
// ════════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "desktop_pet",
    version,
    about = "A desktop pet that wants to play games with you",
    long_about = "Runs a small pet window that walks around the desktop.\n\n\
                  Press H in the pet window for the key map.  Set RUST_LOG=debug\n\
                  for per-tick detail."
)]
pub struct Cli {
    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Camera index to try first
    #[arg(long, value_name = "INDEX")]
    pub camera: Option<u32>,

    /// Animation tick in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Seed the pet's random choices
    #[arg(long)]
    pub seed: Option<u64>,

    /// No voice and no jingles
    #[arg(long)]
    pub silent: bool,

    /// Desktop size, e.g. 2560x1440
    #[arg(long, value_name = "WxH", value_parser = parse_screen)]
    pub screen: Option<(usize, usize)>,
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_screen(s: &str) -> Result<(usize, usize), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: usize = w.trim().parse().map_err(|_| format!("bad width in {s:?}"))?;
    let h: usize = h.trim().parse().map_err(|_| format!("bad height in {s:?}"))?;
    if w < 200 || h < 200 {
        return Err(format!("screen {w}x{h} is too small"));
    }
    Ok((w, h))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = PetConfig::from_toml(
            "[window]\nscreen_width = 2560\n\n[mood]\nstart = 0\n",
            Path::new("pet.toml"),
        )
        .expect("parse");
        assert_eq!(cfg.window.screen_width, 2560);
        assert_eq!(cfg.window.screen_height, 1080);
        assert_eq!(cfg.mood.start, 0);
        assert_eq!(cfg.mood.ceiling, 20);
        assert_eq!(cfg.follow, FollowConfig::default());
    }

    #[test]
    fn bad_file_reports_the_path() {
        let err = PetConfig::from_toml("[window\n", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"), "{err}");
    }

    #[test]
    fn load_reads_a_file_and_tolerates_none() {
        assert_eq!(PetConfig::load(None).expect("defaults"), PetConfig::default());

        let mut f = tempfile_in_target();
        writeln!(f.1, "seed = 9\n[audio]\nenabled = false").expect("write");
        let cfg = PetConfig::load(Some(&f.0)).expect("load");
        assert_eq!(cfg.seed, Some(9));
        assert!(!cfg.audio.enabled);
        let _ = std::fs::remove_file(&f.0);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = PetConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    fn tempfile_in_target() -> (PathBuf, std::fs::File) {
        let path = std::env::temp_dir().join(format!("desktop_pet_cfg_{}.toml", std::process::id()));
        let file = std::fs::File::create(&path).expect("create");
        (path, file)
    }

    #[test]
    fn env_overrides_voice_settings() {
        let env: HashMap<&str, &str> = [
            ("ELEVENLABS_API_KEY", "abc123"),
            ("ELEVENLABS_VOICE_ID", "voice-x"),
            ("PET_AUDIO_PLAYER", "mpv --really-quiet"),
        ]
        .into_iter()
        .collect();
        let mut cfg = PetConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.voice.usable_key(), Some("abc123"));
        assert_eq!(cfg.voice.voice_id, "voice-x");
        assert_eq!(cfg.voice.model_id, DEFAULT_MODEL_ID);
        assert_eq!(cfg.voice.player.as_deref(), Some("mpv --really-quiet"));
    }

    #[test]
    fn placeholder_key_counts_as_absent() {
        let mut cfg = PetConfig::default();
        cfg.apply_env(|k| (k == "ELEVENLABS_API_KEY").then(|| PLACEHOLDER_API_KEY.to_string()));
        assert_eq!(cfg.voice.usable_key(), None);
        cfg.voice.api_key = Some("   ".into());
        assert_eq!(cfg.voice.usable_key(), None);
    }

    #[test]
    fn cli_flags_override_everything() {
        let cli = Cli::try_parse_from([
            "desktop_pet", "--camera", "2", "--tick-ms", "33", "--seed", "7", "--silent",
            "--screen", "1280x720",
        ])
        .expect("parse");
        let mut cfg = PetConfig::default();
        cfg.apply_cli(&cli);
        assert_eq!(cfg.camera.preferred_index, 2);
        assert_eq!(cfg.window.tick(), Duration::from_millis(33));
        assert_eq!((cfg.window.screen_width, cfg.window.screen_height), (1280, 720));
        assert_eq!(cfg.seed, Some(7));
        assert!(!cfg.voice.enabled && !cfg.audio.enabled);
    }

    #[test]
    fn screen_parser() {
        assert_eq!(parse_screen("2560x1440"), Ok((2560, 1440)));
        assert_eq!(parse_screen("800X600"), Ok((800, 600)));
        assert!(parse_screen("800").is_err());
        assert!(parse_screen("axb").is_err());
        assert!(parse_screen("10x10").is_err());
    }
}
