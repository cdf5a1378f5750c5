//! # desktop_pet
//!
//! A small animated pet that walks along the bottom of the desktop, gets
//! annoyed, hijacks the cursor, and asks you to play minigames.  Winning
//! calms it down; losing, refusing or closing the game early does not.
//!
//! ## Pet window keys
//!
//! | Key | Action |
//! |---|---|
//! | `I` / `O` / `G` | pet asks for a game |
//! | `P` | launch a random game right away |
//! | `Y` / `N` | accept / refuse the pending request (N: annoyance +1) |
//! | `1` / `2` / `3` | matcha whisking / hand alternator / click the runaway |
//! | `Q` / `W` / `E` / `R` | cursor hijack: stalk / grab / lock / release |
//! | `T` | cycle the hijack mode |
//! | `A` / `S` | annoyance +2 / −3 |
//! | `L` | say a catch phrase (spoken when a voice is configured) |
//! | `H` | print this map to the log |
//! | `Escape` | quit |
//!
//! Game windows take the mouse, plus `SPACE` (simulate an alternation) and
//! `C` (retry the camera) in the hand game.
//!
//! ## Mood
//!
//! | Annoyance | Tier | Cursor hijack | Comments |
//! |---|---|---|---|
//! | 0–1 | calm | 0.75× | friendly, rare |
//! | 2–5 | neutral | 1× | annoying |
//! | 6–11 | aggressive | 1.3× | annoying |
//! | 12+ | max chaos | 1.6× | annoying |
//!
//! ## Feature flags
//!
//! * (default): no camera capture (the hand game runs in simulation mode)
//!   and text-only speech.
//! * `camera`: OpenCV webcam capture for the hand game, detected by
//!   motion.  Landmark detection needs an opener passed to [`app::run`]
//!   (see `pet_camera::landmark`).
//! * `voice`: ElevenLabs text-to-speech, played through an external mp3
//!   player.

pub mod config;
pub mod mood;
pub mod physics;
pub mod follow;
pub mod behavior;
pub mod comments;
pub mod keys;
pub mod pointer;
pub mod canvas;
pub mod chime;
pub mod voice;
pub mod pet_view;
pub mod game_view;
pub mod app;
