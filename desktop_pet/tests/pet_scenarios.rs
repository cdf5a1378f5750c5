//! Whole-pet scenarios, driven headless through `PetApp` on an explicit
//! timeline.  No windows are opened; the camera opener always fails, so the
//! hand game runs in simulation mode.

use std::sync::Arc;
use std::time::{Duration, Instant};

use desktop_pet::app::{game_manager, PetApp, RequestSource};
use desktop_pet::behavior::Behavior;
use desktop_pet::config::PetConfig;
use desktop_pet::follow::FollowMode;
use desktop_pet::keys::PetKey;
use desktop_pet::physics::Point;
use desktop_pet::pointer::{Pointer, PointerError};
use pet_camera::{CameraError, CameraOpener};
use pet_games::{GameInput, GameKind, GameOutcome};
use pretty_assertions::assert_eq;

fn secs(n: u64) -> Duration { Duration::from_secs(n) }

/// A pointer that sits still and refuses to be moved.
struct StillPointer(Option<Point>);

impl Pointer for StillPointer {
    fn position(&self) -> Option<Point> { self.0 }
    fn warp(&mut self, _to: Point) -> Result<(), PointerError> {
        Err(PointerError::Unsupported("test"))
    }
}

fn config(start: i32) -> PetConfig {
    let mut cfg = PetConfig { seed: Some(11), ..PetConfig::default() };
    cfg.mood.start = start;
    cfg.behavior.request_chance = 0.0;
    cfg.camera.stop_timeout_ms = 200;
    cfg
}

fn pet(cfg: PetConfig, now: Instant) -> PetApp {
    let opener: CameraOpener = Arc::new(|| Err(CameraError::NoCameraFound { tried: 0 }));
    let games = game_manager(&cfg, opener);
    PetApp::new(cfg, games, now)
}

// ════════════════════════════════════════════════════════════════════════════
// Game results and mood
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn ten_simulated_alternations_win_and_calm_the_pet() {
    let t0 = Instant::now();
    let mut app = pet(config(5), t0);
    let mut ptr = StillPointer(None);
    app.handle_key(PetKey::Launch(GameKind::HandAlternator), t0, None);

    for i in 1..=10 {
        app.game_input(GameInput::Simulate, t0 + secs(i));
    }
    let report = app.tick(t0 + secs(11), &mut ptr).expect("game finished");

    assert_eq!(report.outcome, GameOutcome::Won);
    assert_eq!(report.detail, "10/10 alternations");
    assert_eq!(app.mood().annoyance(), 2);
    assert_eq!(app.stats().won, 1);
    assert!(!app.game_running());
}

#[test]
fn camera_that_never_opens_loses_after_thirty_seconds() {
    let t0 = Instant::now();
    let mut app = pet(config(2), t0);
    let mut ptr = StillPointer(None);
    app.handle_key(PetKey::Launch(GameKind::HandAlternator), t0, None);

    assert_eq!(app.tick(t0 + secs(29), &mut ptr), None);
    let report = app.tick(t0 + secs(30), &mut ptr).expect("deadline reached");

    assert_eq!(report.outcome, GameOutcome::Lost);
    assert_eq!(app.mood().annoyance(), 5);
    assert_eq!(app.stats().consecutive_failures, 1);

    // Still alive and listening.
    assert!(!app.quit_requested());
    app.handle_key(PetKey::RequestGame, t0 + secs(31), None);
    assert_eq!(app.request().map(|r| r.source), Some(RequestSource::Manual));
}

#[test]
fn repeated_results_pin_annoyance_to_its_range() {
    let t0 = Instant::now();
    let mut app = pet(config(2), t0);
    let mut ptr = StillPointer(None);
    let (floor, ceiling) = (app.mood().floor(), app.mood().ceiling());

    let mut t = t0;
    for _ in 0..10 {
        app.launch(GameKind::ImpossibleClick, t);
        t += secs(15);
        let r = app.tick(t, &mut ptr).expect("click game always ends");
        assert_eq!(r.outcome, GameOutcome::Lost);
        assert!((floor..=ceiling).contains(&app.mood().annoyance()));
    }
    assert_eq!(app.mood().annoyance(), ceiling);

    for _ in 0..10 {
        app.launch(GameKind::HandAlternator, t);
        for _ in 0..10 {
            app.game_input(GameInput::Simulate, t);
        }
        let r = app.tick(t, &mut ptr).expect("won");
        assert_eq!(r.outcome, GameOutcome::Won);
        assert!((floor..=ceiling).contains(&app.mood().annoyance()));
        t += secs(1);
    }
    assert_eq!(app.mood().annoyance(), floor);
}

// ════════════════════════════════════════════════════════════════════════════
// Game window
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn closing_the_game_window_leaves_a_responsive_pet() {
    let t0 = Instant::now();
    let mut app = pet(config(2), t0);
    let mut ptr = StillPointer(None);
    app.handle_key(PetKey::Launch(GameKind::MatchaWhisking), t0, None);
    assert_eq!(app.take_launched(), Some(GameKind::MatchaWhisking));
    app.tick(t0 + secs(1), &mut ptr);

    app.on_game_window_closed(t0 + secs(2));
    assert!(!app.game_running());
    // No result, so no mood change.
    assert_eq!(app.mood().annoyance(), 2);
    assert_eq!(app.stats().lost, 0);

    app.handle_key(PetKey::Launch(GameKind::ImpossibleClick), t0 + secs(2), None);
    assert_eq!(app.tick(t0 + secs(2), &mut ptr), None);
    assert_eq!(app.current_game().map(|g| g.kind()), Some(GameKind::ImpossibleClick));
}

// ════════════════════════════════════════════════════════════════════════════
// Cursor follow
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn releasing_the_cursor_restores_idle_motion_on_the_next_tick() {
    let t0 = Instant::now();
    let cfg = config(2);
    let (walk, gravity) = (cfg.physics.walk_speed, cfg.physics.gravity);
    let mut app = pet(cfg, t0);
    let mut ptr = StillPointer(Some(Point::new(200.0, 200.0)));

    app.handle_key(PetKey::Follow(FollowMode::Stalk), t0, ptr.0);
    for _ in 0..5 {
        app.tick(t0, &mut ptr);
    }
    assert_eq!(app.behavior(), Behavior::Walking);

    app.handle_key(PetKey::Follow(FollowMode::Idle), t0, ptr.0);
    assert_eq!(app.follow_mode(), FollowMode::Idle);
    let before = app.body().clone();
    assert_eq!(before.vy, 0.0);
    assert_eq!(before.vx, before.facing * walk);

    app.tick(t0, &mut ptr);
    let after = app.body();
    assert!((after.pos.x - (before.pos.x + before.facing * walk)).abs() < 1e-4);
    assert!((after.pos.y - (before.pos.y + gravity)).abs() < 1e-4);
}

#[test]
fn an_unmovable_pointer_does_not_stop_the_lock() {
    let t0 = Instant::now();
    let mut app = pet(config(2), t0);
    let mut ptr = StillPointer(Some(Point::new(50.0, 50.0)));
    app.handle_key(PetKey::Follow(FollowMode::Lock), t0, ptr.0);
    ptr.0 = Some(Point::new(400.0, 400.0));
    for _ in 0..3 {
        app.tick(t0, &mut ptr);
    }
    assert_eq!(app.follow_mode(), FollowMode::Lock);
}
