//! Click the runaway.  It cannot be won: the target flees the pointer,
//! jitters about, and jumps away from clicks that would have landed.

use std::time::{Duration, Instant};

use gesture_count::SessionResult;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::game::{GameInput, GameKind, MiniGame};

pub const AREA_WIDTH:  f32 = 700.0;
pub const AREA_HEIGHT: f32 = 600.0;
/// Top band reserved for the status text.
pub const AREA_TOP:    f32 = 150.0;
pub const TARGET_RADIUS: f32 = 25.0;

const FLEE_DISTANCE:  f32 = 100.0;
const FLEE_STEP:      f32 = 15.0;
const JITTER:         f32 = 5.0;
const JITTER_CHANCE:  f64 = 0.3;
const MOVE_INTERVAL:  Duration = Duration::from_millis(50);
const TAUNT_INTERVAL: Duration = Duration::from_secs(2);

const TAUNTS: &[&str] = &[
    "Too slow!",
    "Can't catch me!",
    "I'm too fast for you!",
    "Nice try, SLOWPOKE!",
    "You'll NEVER click me!",
    "This is impossible and you know it!",
    "Your mouse skills are TERRIBLE!",
    "I'm untouchable!",
    "Give up already!",
];

const MISS_TAUNTS: &[&str] = &[
    "MISSED! Try harder!",
    "Not even close!",
    "Your aim is terrible!",
    "TRY AGAIN!",
];

pub struct ImpossibleClick {
    rng:        StdRng,
    duration:   Duration,
    deadline:   Option<Instant>,
    result:     SessionResult,
    target:     (f32, f32),
    pointer:    Option<(f32, f32)>,
    clicks:     u32,
    taunt:      String,
    last_move:  Option<Instant>,
    last_taunt: Option<Instant>,
}

fn clamp_to_area((x, y): (f32, f32)) -> (f32, f32) {
    (
        x.clamp(TARGET_RADIUS, AREA_WIDTH - TARGET_RADIUS),
        y.clamp(AREA_TOP, AREA_HEIGHT - TARGET_RADIUS),
    )
}

impl ImpossibleClick {
    pub fn new(rng: StdRng) -> Self {
        ImpossibleClick {
            rng,
            duration:   GameKind::ImpossibleClick.duration(),
            deadline:   None,
            result:     SessionResult::Pending,
            target:     (350.0, 350.0),
            pointer:    None,
            clicks:     0,
            taunt:      "Try to click me!".to_string(),
            last_move:  None,
            last_taunt: None,
        }
    }

    pub fn target(&self) -> (f32, f32) { self.target }
    pub fn clicks(&self) -> u32        { self.clicks }
    pub fn taunt(&self)  -> &str       { &self.taunt }

    fn is_active(&self) -> bool {
        self.deadline.is_some() && self.result == SessionResult::Pending
    }

    fn evade(&mut self) {
        let (tx, ty) = self.target;
        if let Some((px, py)) = self.pointer {
            let (dx, dy) = (tx - px, ty - py);
            let distance = dx.hypot(dy);
            if distance < FLEE_DISTANCE {
                let (mx, my) = if distance > 0.0 {
                    (dx / distance * FLEE_STEP, dy / distance * FLEE_STEP)
                } else {
                    (self.rng.gen_range(-20.0..=20.0), self.rng.gen_range(-20.0..=20.0))
                };
                self.target = clamp_to_area((tx + mx, ty + my));
            }
        }
        if self.rng.gen_bool(JITTER_CHANCE) {
            let (tx, ty) = self.target;
            let jx = self.rng.gen_range(-JITTER..=JITTER);
            let jy = self.rng.gen_range(-JITTER..=JITTER);
            self.target = clamp_to_area((tx + jx, ty + jy));
        }
    }

    fn pick(&mut self, lines: &[&str]) -> String {
        lines.choose(&mut self.rng).copied().unwrap_or("...").to_string()
    }
}

impl MiniGame for ImpossibleClick {
    fn kind(&self) -> GameKind { GameKind::ImpossibleClick }

    fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.duration);
        self.result = SessionResult::Pending;
        self.target = (350.0, 350.0);
        self.clicks = 0;
        self.last_move = Some(now);
        self.last_taunt = Some(now);
    }

    fn tick(&mut self, now: Instant) {
        if !self.is_active() {
            return;
        }
        if self.deadline.is_some_and(|d| now >= d) {
            self.result = SessionResult::Lost;
            self.taunt = "GAME OVER! I told you it was impossible!".to_string();
            info!(clicks = self.clicks, "impossible click finished");
            return;
        }
        if self.last_move.map_or(true, |t| now.saturating_duration_since(t) >= MOVE_INTERVAL) {
            self.evade();
            self.last_move = Some(now);
        }
        if self.last_taunt.map_or(true, |t| now.saturating_duration_since(t) >= TAUNT_INTERVAL) {
            self.taunt = self.pick(TAUNTS);
            self.last_taunt = Some(now);
        }
    }

    fn handle_input(&mut self, input: GameInput, _now: Instant) {
        if !self.is_active() {
            return;
        }
        match input {
            GameInput::PointerMoved { x, y } => self.pointer = Some((x, y)),
            GameInput::Click { x, y } => {
                self.clicks += 1;
                self.pointer = Some((x, y));
                let (tx, ty) = self.target;
                if (x - tx).hypot(y - ty) <= TARGET_RADIUS {
                    self.taunt = "SO CLOSE! But I'm too fast!".to_string();
                    let jx = self.rng.gen_range(-100.0..=100.0);
                    let jy = self.rng.gen_range(-80.0..=80.0);
                    self.target = clamp_to_area((tx + jx, ty + jy));
                    // Never stay under the cursor.
                    if (x - self.target.0).hypot(y - self.target.1) <= TARGET_RADIUS {
                        let away_x = if x < AREA_WIDTH / 2.0 { AREA_WIDTH } else { 0.0 };
                        self.target = clamp_to_area((away_x, ty));
                    }
                } else {
                    self.taunt = self.pick(MISS_TAUNTS);
                }
            }
            GameInput::Simulate | GameInput::RetryCamera => {}
        }
    }

    fn end(&mut self) {
        self.pointer = None;
    }

    fn result(&self) -> SessionResult { self.result }

    fn status_line(&self, now: Instant) -> String {
        let left = self.deadline.map_or(self.duration, |d| d.saturating_duration_since(now));
        format!("Clicks: {}  Hits: 0  Time left: {:.1}s  {}",
                self.clicks, left.as_secs_f32(), self.taunt)
    }

    fn detail(&self) -> String {
        format!("{} clicks, 0 hits", self.clicks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn game(seed: u64) -> ImpossibleClick {
        ImpossibleClick::new(StdRng::seed_from_u64(seed))
    }

    fn in_area((x, y): (f32, f32)) -> bool {
        (TARGET_RADIUS..=AREA_WIDTH - TARGET_RADIUS).contains(&x)
            && (AREA_TOP..=AREA_HEIGHT - TARGET_RADIUS).contains(&y)
    }

    #[test]
    fn flees_a_nearby_pointer() {
        let t0 = Instant::now();
        let mut g = game(1);
        g.start(t0);
        g.handle_input(GameInput::PointerMoved { x: 300.0, y: 350.0 }, t0);
        let before = g.target();
        g.tick(t0 + ms(50));
        let after = g.target();
        assert!(after.0 > before.0, "should move right, away from the pointer");
    }

    #[test]
    fn clicks_never_hit_and_the_game_is_always_lost() {
        let t0 = Instant::now();
        for seed in 0..20 {
            let mut g = game(seed);
            g.start(t0);
            let mut t = ms(0);
            while t < ms(15_000) {
                let (x, y) = g.target();
                g.handle_input(GameInput::Click { x, y }, t0 + t);
                let (nx, ny) = g.target();
                assert!((x - nx).hypot(y - ny) > TARGET_RADIUS);
                assert!(in_area(g.target()));
                g.tick(t0 + t);
                t += ms(40);
            }
            g.tick(t0 + ms(15_000));
            assert_eq!(g.result(), SessionResult::Lost);
            assert_eq!(g.clicks(), 375);
        }
    }

    #[test]
    fn stays_inside_the_play_area() {
        let t0 = Instant::now();
        let mut g = game(7);
        g.start(t0);
        // Herd it into a corner.
        for i in 0..300u64 {
            let (x, y) = g.target();
            g.handle_input(GameInput::PointerMoved { x: x - 10.0, y: y - 10.0 }, t0 + ms(i * 50));
            g.tick(t0 + ms(i * 50));
            assert!(in_area(g.target()), "{:?}", g.target());
        }
    }

    #[test]
    fn taunts_rotate() {
        let t0 = Instant::now();
        let mut g = game(3);
        g.start(t0);
        let first = g.taunt().to_string();
        g.tick(t0 + ms(2_000));
        assert_ne!(g.taunt(), first);
    }
}
