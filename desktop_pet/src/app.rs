//! Top-level pet state machine and the window loop.
//!
//! `PetApp` owns the mood, the body, the follow controller, the idle
//! behaviour, the request flow, and the [`GameManager`].  It is driven by
//! three kinds of call, all on the UI thread:
//!
//! | Call | From |
//! |---|---|
//! | [`PetApp::handle_key`] | pet window keyboard |
//! | [`PetApp::game_input`] / [`PetApp::on_game_window_closed`] | the game window |
//! | [`PetApp::tick`] | once per animation tick |
//!
//! Annoyance is written in exactly two places: `handle_key` (A, S, N) and
//! the game-report path inside `tick`.

use std::time::{Duration, Instant};

use pet_camera::{CameraOpener, CaptureConfig};
use pet_games::{ActiveGame, GameInput, GameKind, GameManager, GameOutcome, GameRegistry, GameReport, HandConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::behavior::{Behavior, BehaviorState, Craving, Face};
use crate::chime::{Chime, Jingle};
use crate::comments::{self, CommentClock};
use crate::config::PetConfig;
use crate::follow::{follow_step, lock_drifted, CursorFollowTarget, FollowMode};
use crate::game_view::GameWindow;
use crate::keys::{PetKey, HELP};
use crate::mood::{GameStats, MoodKey, MoodState, Tier};
use crate::pet_view::{DragEvent, PetWindow, ViewError};
use crate::physics::{Bounds, PetBody, Point};
use crate::pointer::Pointer;
use crate::voice::{Voice, PHRASES};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    View(#[from] ViewError),
}

/// The hand game's camera settings from the pet config.
pub fn hand_config(config: &PetConfig, opener: CameraOpener) -> HandConfig {
    let cam = &config.camera;
    let mut hand = HandConfig::new(opener);
    hand.capture = CaptureConfig {
        frame_interval:    Duration::from_millis(cam.frame_interval_ms.max(1)),
        max_read_failures: cam.max_read_failures,
    };
    hand.stop_timeout = Duration::from_millis(cam.stop_timeout_ms);
    hand
}

pub fn game_manager(config: &PetConfig, opener: CameraOpener) -> GameManager {
    GameManager::new(GameRegistry::new(hand_config(config, opener)))
}

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestSource {
    /// Craving or the game-request behaviour.
    Auto,
    /// I, O or G.
    Manual,
}

/// A pending "wanna play?" waiting for Y or N.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameRequest {
    pub source:     RequestSource,
    pub ticks_left: u32,
}

// ════════════════════════════════════════════════════════════════════════════
// PetApp
// ════════════════════════════════════════════════════════════════════════════

pub struct PetApp {
    config: PetConfig,
    rng:    StdRng,
    bounds: Bounds,

    // ── mood ─────────────────────────────────────────────────────────────
    mood:  MoodState,
    stats: GameStats,

    // ── motion ───────────────────────────────────────────────────────────
    body:        PetBody,
    follow:      CursorFollowTarget,
    behavior:    BehaviorState,
    dragging:    bool,
    warp_warned: bool,

    // ── games ────────────────────────────────────────────────────────────
    games:        GameManager,
    craving:      Craving,
    request:      Option<GameRequest>,
    last_request: Option<Instant>,
    launched:     Option<GameKind>,

    // ── speech ───────────────────────────────────────────────────────────
    comments:  CommentClock,
    last_line: String,
    fresh:     Option<String>,
    chime:     Chime,
    voice:     Voice,

    ticks: u64,
    quit:  bool,
}

impl PetApp {
    /// A silent pet: no jingles, text-only voice.
    pub fn new(config: PetConfig, games: GameManager, now: Instant) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let w = &config.window;
        let bounds = Bounds::new(w.screen_width, w.screen_height);
        let size = w.pet_size as f32;
        let start = Point::new((bounds.width - size) / 2.0, (bounds.height - size) / 2.0);
        let body = PetBody::new(start, size, config.physics.walk_speed);
        let behavior = BehaviorState::new(&mut rng);
        let comments = CommentClock::new(now, Duration::from_secs(rng.gen_range(5..=15)));
        PetApp {
            mood: MoodState::new(config.mood.clone()),
            stats: GameStats::default(),
            body,
            follow: CursorFollowTarget::default(),
            behavior,
            dragging: false,
            warp_warned: false,
            games,
            craving: Craving::default(),
            request: None,
            last_request: None,
            launched: None,
            comments,
            last_line: String::new(),
            fresh: None,
            chime: Chime::silent(),
            voice: Voice::silent(),
            ticks: 0,
            quit: false,
            bounds,
            rng,
            config,
        }
    }

    pub fn with_chime(mut self, chime: Chime) -> Self {
        self.chime = chime;
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    pub fn mood(&self)         -> &MoodState        { &self.mood }
    pub fn tier(&self)         -> Tier              { self.mood.tier() }
    pub fn stats(&self)        -> &GameStats        { &self.stats }
    pub fn body(&self)         -> &PetBody          { &self.body }
    pub fn follow_mode(&self)  -> FollowMode        { self.follow.mode() }
    pub fn behavior(&self)     -> Behavior          { self.behavior.current() }
    pub fn face(&self)         -> Face              { self.behavior.face() }
    pub fn blinking(&self)     -> bool              { self.behavior.blinking() }
    pub fn craving(&self)      -> Craving           { self.craving }
    pub fn request(&self)      -> Option<GameRequest> { self.request }
    pub fn current_game(&self) -> Option<&ActiveGame> { self.games.current() }
    pub fn game_running(&self) -> bool              { self.games.is_running() }
    pub fn last_line(&self)    -> &str              { &self.last_line }
    pub fn ticks(&self)        -> u64               { self.ticks }
    pub fn quit_requested(&self) -> bool            { self.quit }

    /// The game launched since the last call, so the loop can open its
    /// window.
    pub fn take_launched(&mut self) -> Option<GameKind> { self.launched.take() }

    /// The line said since the last call.
    pub fn take_speech(&mut self) -> Option<String> { self.fresh.take() }

    // ── speech ───────────────────────────────────────────────────────────

    /// Log and show `line` without sending it to the voice.
    fn show_line(&mut self, line: &str, now: Instant) {
        let tier = self.tier();
        info!(target: "desktop_pet::speech", "{}: {line}", tier.voice_prefix());
        self.comments.restart(tier, now, &mut self.rng);
        self.last_line = line.to_string();
        self.fresh = Some(self.last_line.clone());
    }

    fn say(&mut self, line: &str, now: Instant) {
        if self.voice.speaks_comments() {
            if let Err(e) = self.voice.say(line, false) {
                debug!(error = %e, "comment not spoken");
            }
        }
        self.show_line(line, now);
    }

    fn say_from(&mut self, lines: &[&'static str], now: Instant) {
        let line = comments::pick(&mut self.rng, lines);
        self.say(line, now);
    }

    fn speak_phrase(&mut self, now: Instant) {
        let phrase = comments::pick(&mut self.rng, PHRASES);
        if let Err(e) = self.voice.say(phrase, true) {
            debug!(error = %e, "phrase not spoken");
        }
        self.show_line(phrase, now);
    }

    // ── keys ─────────────────────────────────────────────────────────────

    /// Handle one pet-window key.  `pointer` is the pointer's screen
    /// position, when known.
    pub fn handle_key(&mut self, key: PetKey, now: Instant, pointer: Option<Point>) {
        debug!(?key, "key");
        match key {
            PetKey::RequestGame => {
                if self.games.is_running() {
                    self.say("We're already playing!", now);
                } else {
                    self.start_request(RequestSource::Manual, now);
                }
            }
            PetKey::InstantLaunch => {
                let kind = self.games.registry().random_kind(&mut self.rng);
                self.launch(kind, now);
            }
            PetKey::Accept => {
                if self.request.is_some() {
                    let kind = self.games.registry().random_kind(&mut self.rng);
                    self.launch(kind, now);
                } else {
                    debug!("nothing to accept");
                }
            }
            PetKey::Deny => {
                if self.request.take().is_some() {
                    self.deny(now);
                } else {
                    debug!("nothing to deny");
                }
            }
            PetKey::Launch(kind) => self.launch(kind, now),
            PetKey::Follow(mode) => self.set_follow(mode, pointer, now),
            PetKey::CycleFollow => self.set_follow(self.follow.mode().next(), pointer, now),
            PetKey::RaiseAnnoyance => {
                let a = self.mood.apply_key(MoodKey::Raise);
                info!(annoyance = a, tier = %self.tier(), "annoyance raised");
            }
            PetKey::LowerAnnoyance => {
                let a = self.mood.apply_key(MoodKey::Lower);
                info!(annoyance = a, tier = %self.tier(), "annoyance lowered");
            }
            PetKey::Help => info!("{HELP}"),
            PetKey::Speak => self.speak_phrase(now),
            PetKey::Quit => {
                info!("quit requested");
                self.quit = true;
            }
        }
    }

    fn start_request(&mut self, source: RequestSource, now: Instant) {
        let b = &self.config.behavior;
        let (ticks, lines) = match source {
            RequestSource::Manual => (b.manual_request_ticks, comments::MANUAL_REQUEST),
            RequestSource::Auto   => (b.auto_request_ticks, comments::GAME_REQUEST),
        };
        self.request = Some(GameRequest { source, ticks_left: ticks.max(1) });
        self.last_request = Some(now);
        self.behavior.set(Behavior::GameRequest, ticks, Face::Excited);
        self.chime.play(Jingle::Request);
        info!(?source, "game requested (Y to play, N to refuse)");
        self.say_from(lines, now);
    }

    fn deny(&mut self, now: Instant) {
        let a = self.mood.apply_key(MoodKey::Deny);
        self.stats.denied += 1;
        self.craving.on_deny();
        info!(annoyance = a, denied = self.stats.denied, "game request denied");
        let (next, range) = if self.stats.denied <= 2 {
            (Behavior::Mischief, (90, 180))
        } else {
            (Behavior::Annoying, (120, 240))
        };
        let ticks = self.rng.gen_range(range.0..=range.1);
        self.behavior.set(next, ticks, next.face(self.tier()));
        self.say_from(comments::DENIED, now);
    }

    /// Start `kind`, replacing any running game.
    pub fn launch(&mut self, kind: GameKind, now: Instant) {
        self.games.launch(kind, &mut self.rng, now);
        self.request = None;
        self.last_request = Some(now);
        self.craving.on_launch();
        self.launched = Some(kind);
        let ticks = self.rng.gen_range(180..=360);
        self.behavior.set(Behavior::Walking, ticks, Face::Excited);
        self.chime.play(Jingle::Launch);
        self.say(&format!("Let's play {kind}!"), now);
    }

    fn set_follow(&mut self, mode: FollowMode, pointer: Option<Point>, now: Instant) {
        let was = self.follow.mode();
        if !self.follow.set_mode(mode, pointer, self.bounds) {
            warn!(%mode, "no pointer reading, follow mode unchanged");
            return;
        }
        info!(from = %was, to = %mode, "follow mode");
        match mode {
            FollowMode::Idle => {
                self.body.reset_for_idle(self.config.physics.walk_speed);
                if was.is_following() {
                    self.say("Fine, have your cursor back.", now);
                }
            }
            FollowMode::Stalk => self.say("I'm coming for your cursor!", now),
            FollowMode::Grab  => self.say("Your cursor is MINE now!", now),
            FollowMode::Lock  => self.say("Your cursor stays right there.", now),
        }
    }

    // ── game window ──────────────────────────────────────────────────────

    pub fn game_input(&mut self, input: GameInput, now: Instant) {
        self.games.handle_input(input, now);
    }

    /// The game window was closed by hand: end the game, no result.
    pub fn on_game_window_closed(&mut self, now: Instant) {
        if self.games.close_current() {
            self.say("Quitting already? Coward.", now);
        }
    }

    fn on_report(&mut self, report: &GameReport, now: Instant) {
        let before = self.mood.annoyance();
        let after = self.mood.apply_result(report.outcome);
        self.stats.record(report.outcome);
        info!(
            game = %report.kind,
            outcome = ?report.outcome,
            detail = %report.detail,
            annoyance = format_args!("{before} -> {after}"),
            "game result"
        );
        match report.outcome {
            GameOutcome::Won => {
                self.craving.on_win();
                let ticks = self.rng.gen_range(180..=360);
                self.behavior.set(Behavior::Walking, ticks, Face::Happy);
                self.chime.play(Jingle::Win);
                self.say_from(comments::VICTORY, now);
            }
            GameOutcome::Lost => {
                let next = if self.stats.consecutive_failures >= 3 { Behavior::Annoying } else { Behavior::Mischief };
                let (lo, hi) = next.duration_range();
                let ticks = self.rng.gen_range(lo..=hi);
                self.behavior.set(next, ticks, next.face(self.tier()));
                self.chime.play(Jingle::Lose);
                self.say_from(comments::FAILURE, now);
            }
        }
    }

    // ── dragging ─────────────────────────────────────────────────────────

    pub fn drag_started(&mut self, now: Instant) {
        self.dragging = true;
        self.body.vx = 0.0;
        self.body.vy = 0.0;
        self.say("Hey! Put me down!", now);
    }

    pub fn drag_to(&mut self, top_left: Point) {
        if self.dragging {
            self.body.place(top_left, self.bounds);
        }
    }

    /// Let go: the pet is flung and turns to mischief.
    pub fn drag_released(&mut self, now: Instant) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.body.vx = self.rng.gen_range(-3.0..=3.0);
        self.body.vy = self.rng.gen_range(-2.0..=0.0);
        self.body.on_ground = false;
        let ticks = self.rng.gen_range(60..=180);
        self.behavior.set(Behavior::Mischief, ticks, Face::Mischievous);
        self.say("Now I'm REALLY going to cause trouble!", now);
    }

    pub fn is_dragging(&self) -> bool { self.dragging }

    // ── tick ─────────────────────────────────────────────────────────────

    /// One animation tick.  Returns the report of a game that finished on
    /// this tick, already applied to mood and stats.
    pub fn tick(&mut self, now: Instant, pointer: &mut dyn Pointer) -> Option<GameReport> {
        self.ticks += 1;

        let report = self.games.tick(now);
        if let Some(r) = &report {
            self.on_report(r, now);
        }

        self.behavior.blink_tick(&self.config.behavior, &mut self.rng);

        if self.follow.mode().is_following() {
            self.follow_tick(now, pointer);
        } else if !self.dragging {
            self.idle_tick(now);
        }

        self.request_tick(now);
        self.comment_tick(now);
        report
    }

    fn idle_tick(&mut self, now: Instant) {
        if self.behavior.tick() {
            let next = self.behavior.choose_next(self.tier(), self.stats.consecutive_failures, &mut self.rng);
            debug!(behavior = %next, duration = self.behavior.duration(), "behaviour");
            match next {
                Behavior::GameRequest if self.may_request(now) => self.start_request(RequestSource::Auto, now),
                Behavior::GameRequest => {
                    let ticks = self.rng.gen_range(120..=240);
                    self.behavior.set(Behavior::Walking, ticks, Behavior::Walking.face(self.tier()));
                }
                Behavior::Resting  => self.say_from(comments::RESTING, now),
                Behavior::Mischief => self.say_from(comments::MISCHIEF, now),
                _ => {}
            }
        }
        let physics = &self.config.physics;
        self.behavior.steer(&mut self.body, physics, self.bounds, self.stats.consecutive_failures, &mut self.rng);
        let max = self.behavior.max_speed(physics);
        self.body.idle_step(physics, self.bounds, max);
    }

    fn follow_tick(&mut self, now: Instant, pointer: &mut dyn Pointer) {
        let cfg = &self.config.follow;
        let (fraction, max_step, reach, grab_ticks, tolerance) =
            (cfg.fraction, cfg.max_step, cfg.reach, cfg.grab_ticks, cfg.lock_tolerance);
        let seen = pointer.position();
        let Some(target) = self.follow.target(seen, grab_ticks) else { return };

        let scale = self.tier().hijack_scale();
        let (dx, dy) = follow_step(self.body.center(), target, (fraction * scale).min(1.0), max_step * scale);
        self.body.direct_step(dx, dy, self.bounds);

        match self.follow.mode() {
            FollowMode::Grab => {
                self.warp(pointer, target);
                if self.follow.grab_finished(grab_ticks) {
                    self.set_follow(FollowMode::Idle, seen, now);
                }
            }
            FollowMode::Lock => {
                if let Some(p) = seen.filter(|&p| lock_drifted(target, p, tolerance)) {
                    debug!(x = p.x, y = p.y, "locked pointer drifted");
                    self.warp(pointer, target);
                }
            }
            FollowMode::Stalk => {
                if self.follow.note_reach(self.body.center().distance(target), reach) {
                    self.say("Got you!", now);
                }
            }
            FollowMode::Idle => {}
        }
    }

    fn warp(&mut self, pointer: &mut dyn Pointer, to: Point) {
        if let Err(e) = pointer.warp(to) {
            if !self.warp_warned {
                warn!(error = %e, "cannot move the pointer; hijack is visual only");
                self.warp_warned = true;
            }
        }
    }

    fn may_request(&self, now: Instant) -> bool {
        !self.games.is_running()
            && self.request.is_none()
            && self
                .last_request
                .map_or(true, |t| now.saturating_duration_since(t) >= self.config.behavior.request_cooldown())
    }

    fn request_tick(&mut self, now: Instant) {
        if let Some(req) = self.request.as_mut() {
            req.ticks_left = req.ticks_left.saturating_sub(1);
            if req.ticks_left == 0 {
                self.request = None;
                self.stats.timed_out += 1;
                info!(timed_out = self.stats.timed_out, "game request ignored");
                self.say_from(comments::IGNORED, now);
            }
            return;
        }
        if self.games.is_running() {
            return;
        }
        let b = &self.config.behavior;
        let (per_tick, threshold, chance) = (b.craving_per_tick, b.craving_threshold, b.request_chance);
        self.craving.grow(per_tick);
        if self.craving.exceeds(threshold) && self.may_request(now) && self.rng.gen_bool(chance.clamp(0.0, 1.0)) {
            self.start_request(RequestSource::Auto, now);
        }
    }

    fn comment_tick(&mut self, now: Instant) {
        if self.request.is_some() || self.dragging {
            return;
        }
        let tier = self.tier();
        if self.comments.should_comment(tier, now, &mut self.rng) {
            self.say_from(comments::idle_lines(tier), now);
        }
    }

    /// Stop the game and the audio threads.
    pub fn shutdown(&mut self) {
        self.games.close_current();
        self.chime.quit();
        self.voice.quit();
        info!(
            won = self.stats.won,
            lost = self.stats.lost,
            denied = self.stats.denied,
            annoyance = self.mood.annoyance(),
            "pet shutting down"
        );
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Main loop
// ════════════════════════════════════════════════════════════════════════════

/// Open the pet window and run until it is closed or Escape is pressed.
pub fn run(config: PetConfig, opener: CameraOpener) -> Result<(), AppError> {
    let now = Instant::now();
    let games = game_manager(&config, opener);
    let mut app = PetApp::new(config.clone(), games, now)
        .with_chime(Chime::spawn(&config.audio))
        .with_voice(Voice::spawn(&config.voice));

    let win = &config.window;
    let mut pet = PetWindow::new(win.pet_size, app.body().pos, win.tick())?;
    let mut game_win: Option<GameWindow> = None;
    info!(screen = format_args!("{}x{}", win.screen_width, win.screen_height), "pet running; press H for keys");

    while pet.is_open() && !app.quit_requested() {
        let now = Instant::now();
        let mut pointer = pet.pointer();

        // 1. Pet window input
        for key in pet.poll_keys() {
            app.handle_key(key, now, pointer.position());
        }
        match pet.poll_drag(app.body().pos) {
            DragEvent::Started   => app.drag_started(now),
            DragEvent::Moved(p)  => app.drag_to(p),
            DragEvent::Released  => app.drag_released(now),
            DragEvent::None      => {}
        }

        // 2. Game window input; a closed window only ends its game
        if game_win.as_ref().is_some_and(|w| !w.is_open()) {
            game_win = None;
            app.on_game_window_closed(now);
        }
        if let Some(w) = game_win.as_mut() {
            for input in w.poll() {
                app.game_input(input, now);
            }
        }

        // 3. Per-tick logic
        app.tick(now, &mut pointer);

        if let Some(kind) = app.take_launched() {
            game_win = match GameWindow::open(kind, win.game_width, win.game_height) {
                Ok(w) => Some(w),
                Err(e) => {
                    warn!(error = %e, "cannot open game window");
                    app.on_game_window_closed(now);
                    None
                }
            };
        }
        if !app.game_running() {
            game_win = None;
        }

        // 4. Render
        if let (Some(w), Some(game)) = (game_win.as_mut(), app.current_game()) {
            w.render(game, now);
        }
        if let Some(line) = app.take_speech() {
            pet.set_speech(&line);
        }
        pet.set_position(app.body().pos);
        pet.render(app.face(), app.blinking(), app.body().facing, app.tier());
    }

    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pet_camera::CameraError;
    use pretty_assertions::assert_eq;

    use crate::pointer::PointerError;
    use crate::voice::{Speaker, VoiceError};

    #[derive(Default)]
    struct FakePointer {
        at:     Option<Point>,
        warped: Vec<Point>,
    }

    impl Pointer for FakePointer {
        fn position(&self) -> Option<Point> { self.at }
        fn warp(&mut self, to: Point) -> Result<(), PointerError> {
            self.warped.push(to);
            self.at = Some(to);
            Ok(())
        }
    }

    fn quiet_config() -> PetConfig {
        let mut cfg = PetConfig { seed: Some(7), ..PetConfig::default() };
        cfg.behavior.request_chance = 0.0;
        cfg
    }

    fn app_with(cfg: PetConfig, now: Instant) -> PetApp {
        let opener: CameraOpener = Arc::new(|| Err(CameraError::Unavailable));
        let games = game_manager(&cfg, opener);
        PetApp::new(cfg, games, now)
    }

    #[test]
    fn manual_request_then_accept_launches_a_game() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        app.handle_key(PetKey::RequestGame, t0, None);
        assert_eq!(app.request().map(|r| r.source), Some(RequestSource::Manual));
        assert_eq!(app.behavior(), Behavior::GameRequest);
        app.handle_key(PetKey::Accept, t0, None);
        assert!(app.game_running());
        assert!(app.request().is_none());
        assert!(app.take_launched().is_some());
        assert!(app.take_launched().is_none());
    }

    #[test]
    fn deny_costs_one_annoyance_and_counts() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        let before = app.mood().annoyance();
        app.handle_key(PetKey::RequestGame, t0, None);
        app.handle_key(PetKey::Deny, t0, None);
        assert_eq!(app.mood().annoyance(), before + 1);
        assert_eq!(app.stats().denied, 1);
        assert_eq!(app.behavior(), Behavior::Mischief);
        // N with nothing pending does nothing.
        app.handle_key(PetKey::Deny, t0, None);
        assert_eq!(app.mood().annoyance(), before + 1);
    }

    #[test]
    fn ignored_request_times_out_without_touching_annoyance() {
        let t0 = Instant::now();
        let mut cfg = quiet_config();
        cfg.behavior.manual_request_ticks = 3;
        let mut app = app_with(cfg, t0);
        let mut ptr = FakePointer::default();
        let before = app.mood().annoyance();
        app.handle_key(PetKey::RequestGame, t0, None);
        for _ in 0..3 {
            app.tick(t0, &mut ptr);
        }
        assert!(app.request().is_none());
        assert_eq!(app.stats().timed_out, 1);
        assert_eq!(app.mood().annoyance(), before);
    }

    #[test]
    fn annoyance_keys_move_mood() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        app.handle_key(PetKey::RaiseAnnoyance, t0, None);
        assert_eq!(app.mood().annoyance(), 4);
        app.handle_key(PetKey::LowerAnnoyance, t0, None);
        assert_eq!(app.mood().annoyance(), 1);
        assert_eq!(app.tier(), Tier::Calm);
    }

    #[test]
    fn lock_and_grab_need_a_pointer() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        app.handle_key(PetKey::Follow(FollowMode::Lock), t0, None);
        assert_eq!(app.follow_mode(), FollowMode::Idle);
        app.handle_key(PetKey::Follow(FollowMode::Lock), t0, Some(Point::new(10.0, 10.0)));
        assert_eq!(app.follow_mode(), FollowMode::Lock);
    }

    #[test]
    fn stalking_closes_in_on_the_pointer() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        let mut ptr = FakePointer { at: Some(Point::new(100.0, 100.0)), ..FakePointer::default() };
        app.handle_key(PetKey::Follow(FollowMode::Stalk), t0, ptr.at);
        let d0 = app.body().center().distance(Point::new(100.0, 100.0));
        app.tick(t0, &mut ptr);
        let d1 = app.body().center().distance(Point::new(100.0, 100.0));
        assert!(d1 < d0);
        assert!(d0 - d1 <= app.config.follow.max_step * app.tier().hijack_scale() + 1e-3);
        for _ in 0..300 {
            app.tick(t0, &mut ptr);
        }
        assert_eq!(app.last_line(), "Got you!");
    }

    #[test]
    fn lock_pulls_a_drifting_pointer_back() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        let anchor = Point::new(500.0, 400.0);
        let mut ptr = FakePointer { at: Some(anchor), ..FakePointer::default() };
        app.handle_key(PetKey::Follow(FollowMode::Lock), t0, ptr.at);
        ptr.at = Some(Point::new(501.0, 400.0));
        app.tick(t0, &mut ptr);
        assert!(ptr.warped.is_empty());
        ptr.at = Some(Point::new(520.0, 400.0));
        app.tick(t0, &mut ptr);
        assert_eq!(ptr.warped, vec![anchor]);
    }

    #[test]
    fn grab_drags_the_pointer_up_then_lets_go() {
        let t0 = Instant::now();
        let mut cfg = quiet_config();
        cfg.follow.grab_ticks = 10;
        let mut app = app_with(cfg, t0);
        let mut ptr = FakePointer { at: Some(Point::new(300.0, 900.0)), ..FakePointer::default() };
        app.handle_key(PetKey::Follow(FollowMode::Grab), t0, ptr.at);
        for _ in 0..10 {
            app.tick(t0, &mut ptr);
        }
        let last = ptr.warped.last().copied();
        assert_eq!(last, Some(Point::new(960.0, 20.0)));
        assert_eq!(app.follow_mode(), FollowMode::Idle);
    }

    #[test]
    fn drag_release_makes_mischief() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        app.drag_started(t0);
        assert_eq!(app.last_line(), "Hey! Put me down!");
        app.drag_to(Point::new(10.0, 20.0));
        assert_eq!(app.body().pos, Point::new(10.0, 20.0));
        let mut ptr = FakePointer::default();
        app.tick(t0, &mut ptr);
        assert_eq!(app.body().pos, Point::new(10.0, 20.0));
        app.drag_released(t0);
        assert!(!app.is_dragging());
        assert_eq!(app.behavior(), Behavior::Mischief);
        assert_eq!(app.face(), Face::Mischievous);
    }

    #[test]
    fn cravings_lead_to_requests() {
        let t0 = Instant::now();
        let mut cfg = quiet_config();
        cfg.behavior.request_chance = 1.0;
        cfg.behavior.craving_per_tick = 0.5;
        let mut app = app_with(cfg, t0);
        let mut ptr = FakePointer::default();
        for _ in 0..3 {
            app.tick(t0, &mut ptr);
        }
        assert_eq!(app.request().map(|r| r.source), Some(RequestSource::Auto));
    }

    #[test]
    fn speech_is_handed_out_once() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        app.handle_key(PetKey::Speak, t0, None);
        let line = app.take_speech().expect("spoke");
        assert!(PHRASES.contains(&line.as_str()));
        assert_eq!(app.take_speech(), None);
    }

    #[derive(Clone, Default)]
    struct Heard(Arc<std::sync::Mutex<Vec<String>>>);

    impl Speaker for Heard {
        fn speak(&mut self, text: &str) -> Result<(), VoiceError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str { "heard" }
    }

    #[test]
    fn each_phrase_is_spoken_once_even_when_comments_are_spoken() {
        let t0 = Instant::now();
        let heard = Heard::default();
        let voice = Voice::spawn_with(Box::new(heard.clone()), 8).with_comments(true);
        let mut app = app_with(quiet_config(), t0).with_voice(voice);

        app.handle_key(PetKey::Speak, t0, None);
        let first = app.take_speech().expect("spoke");
        app.handle_key(PetKey::Speak, t0, None);
        let second = app.take_speech().expect("spoke");
        std::thread::sleep(Duration::from_millis(200));
        app.shutdown();

        assert_eq!(*heard.0.lock().unwrap(), vec![first, second]);
    }

    #[test]
    fn comments_reach_the_voice_when_enabled() {
        let t0 = Instant::now();
        let heard = Heard::default();
        let voice = Voice::spawn_with(Box::new(heard.clone()), 8).with_comments(true);
        let mut app = app_with(quiet_config(), t0).with_voice(voice);

        app.handle_key(PetKey::Follow(FollowMode::Stalk), t0, Some(Point::new(10.0, 10.0)));
        let line = app.take_speech().expect("announced the stalk");
        std::thread::sleep(Duration::from_millis(200));
        app.shutdown();

        assert_eq!(*heard.0.lock().unwrap(), vec![line]);
    }

    #[test]
    fn escape_requests_quit() {
        let t0 = Instant::now();
        let mut app = app_with(quiet_config(), t0);
        app.handle_key(PetKey::Quit, t0, None);
        assert!(app.quit_requested());
        app.shutdown();
    }
}
