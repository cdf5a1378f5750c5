//! Matcha whisking: circle the pointer inside the bowl fast and evenly
//! enough to raise the liquid to the red line before time runs out.
//!
//! # Scoring
//!
//! Each pointer sample inside 1.4 × the bowl radius contributes an angle
//! delta (around the bowl centre) to a 15-entry rotation history, and a
//! position to a 20-entry trail used for speed.  Whisking power is zero
//! unless all of these hold:
//!
//! * the last segment moved more than 3 px,
//! * the last five angle deltas add up to more than 0.3 rad,
//! * average speed over the last five segments is at least 30 px/s.
//!
//! Otherwise
//!
//! ```text
//! power = 100 × (0.2·distance + 0.2·speed + 0.6·consistency)
//! ```
//!
//! where *distance* peaks at 0.7 × the bowl radius, *speed* peaks at
//! 105 px/s, and *consistency* is 1 − 4 × the mean absolute deviation of the
//! rotation history (0 until eight deltas are known).
//!
//! Every tick the liquid rises by `power × 0.006 × streak bonus` (bonus up
//! to 1.4× for a run of samples with technique ≥ 0.65) and decays by 0.04
//! (power < 35) or 0.015, never dropping below 15.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::time::{Duration, Instant};

use gesture_count::SessionResult;
use tracing::info;

use crate::game::{GameInput, GameKind, MiniGame};

pub const START_LEVEL:  f32 = 20.0;
pub const TARGET_LEVEL: f32 = 80.0;
pub const MAX_LEVEL:    f32 = 100.0;
pub const FLOOR_LEVEL:  f32 = 15.0;

const ROTATION_HISTORY: usize = 15;
const TRAIL_LEN:        usize = 20;
const OPTIMAL_SPEED:    f32 = 105.0;
const GOOD_TECHNIQUE:   f32 = 0.65;

/// Bowl geometry in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bowl {
    pub cx:     f32,
    pub cy:     f32,
    pub width:  f32,
    pub height: f32,
}

impl Default for Bowl {
    fn default() -> Self {
        Bowl { cx: 400.0, cy: 350.0, width: 200.0, height: 120.0 }
    }
}

impl Bowl {
    pub fn radius(&self) -> f32 { self.width.min(self.height) / 2.0 }
}

#[derive(Debug)]
pub struct MatchaWhisking {
    bowl:        Bowl,
    duration:    Duration,
    deadline:    Option<Instant>,
    result:      SessionResult,
    liquid:      f32,
    power:       f32,
    streak:      u32,
    trail:       VecDeque<(f32, f32, Instant)>,
    rotation:    VecDeque<f32>,
    last_angle:  Option<f32>,
    speed:       f32,
    /// Cosmetic whisk angle for drawing, radians.
    whisk_angle: f32,
}

impl Default for MatchaWhisking {
    fn default() -> Self { MatchaWhisking::new(Bowl::default()) }
}

impl MatchaWhisking {
    pub fn new(bowl: Bowl) -> Self {
        MatchaWhisking {
            bowl,
            duration:    GameKind::MatchaWhisking.duration(),
            deadline:    None,
            result:      SessionResult::Pending,
            liquid:      START_LEVEL,
            power:       0.0,
            streak:      0,
            trail:       VecDeque::with_capacity(TRAIL_LEN),
            rotation:    VecDeque::with_capacity(ROTATION_HISTORY),
            last_angle:  None,
            speed:       0.0,
            whisk_angle: 0.0,
        }
    }

    pub fn bowl(&self)        -> &Bowl { &self.bowl }
    pub fn liquid(&self)      -> f32   { self.liquid }
    pub fn power(&self)       -> f32   { self.power }
    pub fn streak(&self)      -> u32   { self.streak }
    pub fn whisk_angle(&self) -> f32   { self.whisk_angle }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.map_or(self.duration, |d| d.saturating_duration_since(now))
    }

    fn is_active(&self) -> bool {
        self.deadline.is_some() && self.result == SessionResult::Pending
    }

    fn whisk(&mut self, x: f32, y: f32, now: Instant) {
        self.trail.push_back((x, y, now));
        if self.trail.len() > TRAIL_LEN {
            self.trail.pop_front();
        }

        let (dx, dy) = (x - self.bowl.cx, y - self.bowl.cy);
        let distance = dx.hypot(dy);
        let radius = self.bowl.radius();
        let optimal = radius * 0.7;

        if distance > radius * 1.4 {
            self.power = 0.0;
            self.last_angle = None;
            return;
        }

        let angle = dy.atan2(dx);
        let Some(last) = self.last_angle.replace(angle) else {
            self.power = 0.0;
            return;
        };
        let mut delta = angle - last;
        if delta > PI {
            delta -= 2.0 * PI;
        } else if delta < -PI {
            delta += 2.0 * PI;
        }
        self.rotation.push_back(delta);
        if self.rotation.len() > ROTATION_HISTORY {
            self.rotation.pop_front();
        }
        if delta.abs() > 0.04 {
            self.whisk_angle = (self.whisk_angle + delta * 8.0).rem_euclid(2.0 * PI);
        }

        let moved = self.last_segment().is_some_and(|d| d > 3.0);
        let rotating = self.rotation.len() >= 5
            && self.rotation.iter().rev().take(5).map(|r| r.abs()).sum::<f32>() > 0.3;
        if let Some(s) = self.recent_speed() {
            self.speed = s;
        }

        if !moved || !rotating || self.speed < 30.0 {
            self.power = 0.0;
            return;
        }

        let distance_score = (1.0 - (distance - optimal).abs() / (optimal * 0.5)).max(0.0);
        let speed_score =
            (1.0 - (self.speed - OPTIMAL_SPEED).abs() / (OPTIMAL_SPEED * 0.55)).max(0.0);
        let consistency = self.consistency();

        let technique = 0.2 * distance_score + 0.2 * speed_score + 0.6 * consistency;
        self.power = technique * 100.0;
        if technique >= GOOD_TECHNIQUE {
            self.streak += 1;
        }
    }

    fn last_segment(&self) -> Option<f32> {
        let n = self.trail.len();
        if n < 2 {
            return None;
        }
        let (x1, y1, _) = self.trail[n - 2];
        let (x2, y2, _) = self.trail[n - 1];
        Some((x2 - x1).hypot(y2 - y1))
    }

    /// Mean px/s over the last five segments.
    fn recent_speed(&self) -> Option<f32> {
        if self.trail.len() < 3 {
            return None;
        }
        let start = self.trail.len().saturating_sub(6);
        let pts: Vec<_> = self.trail.iter().skip(start).collect();
        let speeds: Vec<f32> = pts
            .windows(2)
            .filter_map(|w| {
                let (x1, y1, t1) = *w[0];
                let (x2, y2, t2) = *w[1];
                let dt = t2.saturating_duration_since(t1).as_secs_f32();
                (dt > 0.0).then(|| (x2 - x1).hypot(y2 - y1) / dt)
            })
            .collect();
        if speeds.is_empty() {
            None
        } else {
            Some(speeds.iter().sum::<f32>() / speeds.len() as f32)
        }
    }

    fn consistency(&self) -> f32 {
        if self.rotation.len() < 8 {
            return 0.0;
        }
        let n = self.rotation.len() as f32;
        let mean = self.rotation.iter().sum::<f32>() / n;
        let deviation = self.rotation.iter().map(|r| (r - mean).abs()).sum::<f32>() / n;
        (1.0 - deviation * 4.0).max(0.0)
    }
}

impl MiniGame for MatchaWhisking {
    fn kind(&self) -> GameKind { GameKind::MatchaWhisking }

    fn start(&mut self, now: Instant) {
        *self = MatchaWhisking::new(self.bowl);
        self.deadline = Some(now + self.duration);
    }

    fn tick(&mut self, now: Instant) {
        if !self.is_active() {
            return;
        }
        if self.liquid >= TARGET_LEVEL {
            self.result = SessionResult::Won;
        } else if self.deadline.is_some_and(|d| now >= d) {
            self.result = SessionResult::Lost;
        }
        if self.result.is_terminal() {
            info!(result = ?self.result, liquid = self.liquid, "matcha finished");
            return;
        }

        let bonus = (1.0 + self.streak as f32 * 0.015).min(1.4);
        self.liquid = (self.liquid + self.power * 0.006 * bonus).min(MAX_LEVEL);
        let decay = if self.power < 35.0 { 0.04 } else { 0.015 };
        self.liquid = (self.liquid - decay).max(FLOOR_LEVEL);
    }

    fn handle_input(&mut self, input: GameInput, now: Instant) {
        if let GameInput::PointerMoved { x, y } = input {
            if self.is_active() {
                self.whisk(x, y, now);
            }
        }
    }

    fn end(&mut self) {
        self.power = 0.0;
    }

    fn result(&self) -> SessionResult { self.result }

    fn status_line(&self, now: Instant) -> String {
        match self.result {
            SessionResult::Won  => "PERFECT MATCHA!".to_string(),
            SessionResult::Lost => "Time's up!".to_string(),
            SessionResult::Pending => format!(
                "Time {}s  liquid {:.0}/{:.0}  power {:.0}",
                self.remaining(now).as_secs(), self.liquid, TARGET_LEVEL, self.power),
        }
    }

    fn detail(&self) -> String {
        format!("liquid {:.0}/{:.0}", self.liquid, TARGET_LEVEL)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    /// Circle the bowl at radius `r`, stepping `step` rad every 50 ms and
    /// ticking every ~16 ms, for `total`.
    fn whisk_circles(g: &mut MatchaWhisking, t0: Instant, r: f32, step: f32, total: Duration) {
        let bowl = *g.bowl();
        let mut angle: f32 = 0.0;
        let mut t = ms(0);
        while t <= total && !g.result().is_terminal() {
            if t.as_millis() % 50 == 0 {
                let (x, y) = (bowl.cx + r * angle.cos(), bowl.cy + r * angle.sin());
                g.handle_input(GameInput::PointerMoved { x, y }, t0 + t);
                angle += step;
            }
            g.tick(t0 + t);
            t += ms(10);
        }
    }

    #[test]
    fn steady_circles_win() {
        let t0 = Instant::now();
        let mut g = MatchaWhisking::default();
        g.start(t0);
        // 42 px radius, 0.125 rad per 50 ms ≈ 105 px/s.
        whisk_circles(&mut g, t0, 42.0, 0.125, ms(9_000));
        assert_eq!(g.result(), SessionResult::Won);
        assert!(g.liquid() >= TARGET_LEVEL);
        assert!(g.streak() > 0);
    }

    #[test]
    fn idle_pointer_decays_to_floor_and_loses() {
        let t0 = Instant::now();
        let mut g = MatchaWhisking::default();
        g.start(t0);
        let mut t = t0;
        while t < t0 + ms(10_000) {
            g.tick(t);
            t += ms(16);
        }
        assert_eq!(g.liquid(), FLOOR_LEVEL);
        g.tick(t0 + ms(10_000));
        assert_eq!(g.result(), SessionResult::Lost);
    }

    #[test]
    fn whisking_outside_the_bowl_has_no_power() {
        let t0 = Instant::now();
        let mut g = MatchaWhisking::default();
        g.start(t0);
        whisk_circles(&mut g, t0, 150.0, 0.125, ms(2_000));
        assert_eq!(g.power(), 0.0);
    }

    #[test]
    fn jiggling_in_place_has_no_power() {
        let t0 = Instant::now();
        let mut g = MatchaWhisking::default();
        g.start(t0);
        for i in 0..40u64 {
            let x = 442.0 + if i % 2 == 0 { 0.0 } else { 2.0 };
            g.handle_input(GameInput::PointerMoved { x, y: 350.0 }, t0 + ms(i * 50));
        }
        assert_eq!(g.power(), 0.0);
    }

    #[test]
    fn input_before_start_is_ignored() {
        let mut g = MatchaWhisking::default();
        g.handle_input(GameInput::PointerMoved { x: 442.0, y: 350.0 }, Instant::now());
        g.tick(Instant::now());
        assert_eq!(g.liquid(), START_LEVEL);
        assert_eq!(g.result(), SessionResult::Pending);
    }
}
