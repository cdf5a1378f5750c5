//! Idle behaviours, the face that goes with them, blinking, and game
//! craving.
//!
//! When the current behaviour's duration (in animation ticks) runs out, the
//! next one is drawn with tier-dependent relative weights over
//! `[walking, resting, mischief, annoying, game-request]`:
//!
//! | Tier | Weights |
//! |---|---|
//! | Calm | 0.30 0.15 0.00 0.00 0.55 |
//! | Neutral | 0.20 0.10 0.10 0.05 0.50 |
//! | Aggressive | 0.15 0.07 0.10 0.10 0.40 |
//! | MaxChaos | 0.10 0.05 0.20 0.30 0.00 |
//! | ≥ 3 losses in a row | 0.05 0.02 0.25 0.40 0.00 |

use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::config::{BehaviorConfig, PhysicsConfig};
use crate::mood::Tier;
use crate::physics::{Bounds, PetBody};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Behavior {
    Walking,
    Resting,
    Mischief,
    Annoying,
    GameRequest,
}

impl Behavior {
    pub const ALL: [Behavior; 5] = [
        Behavior::Walking,
        Behavior::Resting,
        Behavior::Mischief,
        Behavior::Annoying,
        Behavior::GameRequest,
    ];

    /// Inclusive duration range in ticks.
    pub fn duration_range(self) -> (u32, u32) {
        match self {
            Behavior::Walking     => (180, 360),
            Behavior::Resting     => (60, 120),
            Behavior::Mischief    => (90, 180),
            Behavior::Annoying    => (120, 240),
            Behavior::GameRequest => (120, 180),
        }
    }

    pub fn face(self, tier: Tier) -> Face {
        match self {
            Behavior::Walking if tier == Tier::Calm => Face::Happy,
            Behavior::Walking                       => Face::Mischievous,
            Behavior::Resting                       => Face::Sleepy,
            Behavior::Mischief                      => Face::Mischievous,
            Behavior::Annoying                      => Face::Annoying,
            Behavior::GameRequest                   => Face::Excited,
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Behavior::Walking     => "walking",
            Behavior::Resting     => "resting",
            Behavior::Mischief    => "mischief",
            Behavior::Annoying    => "annoying",
            Behavior::GameRequest => "game-request",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face { Happy, Sleepy, Excited, Mischievous, Annoying }

pub fn weights(tier: Tier, consecutive_failures: u32) -> [f64; 5] {
    if consecutive_failures >= 3 {
        return [0.05, 0.02, 0.25, 0.4, 0.0];
    }
    match tier {
        Tier::Calm       => [0.3, 0.15, 0.0, 0.0, 0.55],
        Tier::Neutral    => [0.2, 0.1, 0.1, 0.05, 0.5],
        Tier::Aggressive => [0.15, 0.07, 0.1, 0.1, 0.4],
        Tier::MaxChaos   => [0.1, 0.05, 0.2, 0.3, 0.0],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// BehaviorState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct BehaviorState {
    current:     Behavior,
    face:        Face,
    timer:       u32,
    duration:    u32,
    blink_timer: u32,
    blinking:    bool,
}

impl BehaviorState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        BehaviorState {
            current:     Behavior::Walking,
            face:        Face::Happy,
            timer:       0,
            duration:    rng.gen_range(120..=300),
            blink_timer: 0,
            blinking:    false,
        }
    }

    pub fn current(&self)  -> Behavior { self.current }
    pub fn face(&self)     -> Face     { self.face }
    pub fn timer(&self)    -> u32      { self.timer }
    pub fn duration(&self) -> u32      { self.duration }
    pub fn blinking(&self) -> bool     { self.blinking }

    /// Advance one tick.  True when the current behaviour has run its course.
    pub fn tick(&mut self) -> bool {
        self.timer = self.timer.saturating_add(1);
        self.timer >= self.duration
    }

    /// Switch to `behavior` for `duration` ticks.
    pub fn set(&mut self, behavior: Behavior, duration: u32, face: Face) {
        self.current = behavior;
        self.face = face;
        self.timer = 0;
        self.duration = duration.max(1);
    }

    pub fn set_face(&mut self, face: Face) { self.face = face; }

    /// Draw the next behaviour and its duration.
    pub fn choose_next<R: Rng + ?Sized>(&mut self, tier: Tier, consecutive_failures: u32, rng: &mut R) -> Behavior {
        let next = WeightedIndex::new(weights(tier, consecutive_failures))
            .map(|w| Behavior::ALL[w.sample(rng)])
            .unwrap_or(Behavior::Walking);
        let (lo, hi) = next.duration_range();
        self.set(next, rng.gen_range(lo..=hi), next.face(tier));
        next
    }

    pub fn blink_tick<R: Rng + ?Sized>(&mut self, cfg: &BehaviorConfig, rng: &mut R) {
        self.blink_timer = self.blink_timer.saturating_add(1);
        if self.blink_timer > cfg.blink_every {
            self.blinking = true;
            if self.blink_timer > cfg.blink_every + cfg.blink_ticks {
                self.blinking = false;
                self.blink_timer = rng.gen_range(0..=60);
            }
        }
    }

    /// Horizontal speed cap for this behaviour.
    pub fn max_speed(&self, cfg: &PhysicsConfig) -> f32 {
        match self.current {
            Behavior::Mischief => cfg.mischief_max_speed,
            _                  => cfg.max_speed,
        }
    }

    /// Adjust the body's velocity for the current behaviour, ahead of the
    /// idle physics step.
    pub fn steer<R: Rng + ?Sized>(
        &self,
        body:     &mut PetBody,
        cfg:      &PhysicsConfig,
        bounds:   Bounds,
        failures: u32,
        rng:      &mut R,
    ) {
        let walk = cfg.walk_speed;
        match self.current {
            Behavior::Walking => {
                if body.vx.abs() < walk {
                    body.vx = if body.vx >= 0.0 { walk } else { -walk };
                }
            }
            Behavior::Resting => {
                body.vx *= 0.95;
                body.vy *= 0.95;
                let min = walk * 0.3;
                if body.vx.abs() < min {
                    body.vx = if body.vx >= 0.0 { min } else { -min };
                }
            }
            Behavior::Mischief => {
                // Heads for the top-right corner.
                let target_x = bounds.width - body.size - 50.0;
                if body.pos.x < target_x {
                    body.vx = body.vx.abs().max(walk) * 1.8;
                }
                if body.pos.y > 50.0 {
                    body.vy -= 0.8;
                }
            }
            Behavior::Annoying => {
                let erratic = 1.0 + failures.min(10) as f32 * 0.3;
                body.vx += rng.gen_range(-1.0..=1.0) * erratic;
                body.vy += rng.gen_range(-1.0..=1.0) * erratic;
            }
            Behavior::GameRequest => {
                body.vx *= 0.8;
                body.vy *= 0.8;
                if self.timer % 30 == 0 {
                    body.vy -= 1.0;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Craving
// ════════════════════════════════════════════════════════════════════════════

/// Builds up while no game runs; high craving makes automatic requests
/// possible.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Craving(f32);

impl Craving {
    pub fn level(self) -> f32 { self.0 }

    pub fn grow(&mut self, amount: f32)    { self.0 += amount.max(0.0); }
    pub fn relieve(&mut self, amount: f32) { self.0 = (self.0 - amount).max(0.0); }

    pub fn on_launch(&mut self) { self.relieve(5.0); }
    pub fn on_deny(&mut self)   { self.relieve(0.5); }
    pub fn on_win(&mut self)    { self.relieve(3.0); }

    pub fn exceeds(self, threshold: f32) -> bool { self.0 > threshold }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn weights_are_usable() {
        for tier in [Tier::Calm, Tier::Neutral, Tier::Aggressive, Tier::MaxChaos] {
            for failures in [0, 3] {
                let w = weights(tier, failures);
                assert!(w.iter().all(|&x| x >= 0.0));
                assert!(WeightedIndex::new(w).is_ok(), "{tier} {failures}");
            }
        }
    }

    #[test]
    fn max_chaos_never_asks_for_games() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut b = BehaviorState::new(&mut rng);
        for _ in 0..500 {
            assert_ne!(b.choose_next(Tier::MaxChaos, 0, &mut rng), Behavior::GameRequest);
        }
    }

    #[test]
    fn calm_pets_never_misbehave() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut b = BehaviorState::new(&mut rng);
        for _ in 0..500 {
            let next = b.choose_next(Tier::Calm, 0, &mut rng);
            assert!(!matches!(next, Behavior::Mischief | Behavior::Annoying));
            let (lo, hi) = next.duration_range();
            assert!((lo..=hi).contains(&b.duration()));
        }
    }

    #[test]
    fn duration_elapses() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut b = BehaviorState::new(&mut rng);
        b.set(Behavior::Resting, 3, Face::Sleepy);
        assert!(!b.tick());
        assert!(!b.tick());
        assert!(b.tick());
    }

    #[test]
    fn blinks_briefly() {
        let mut rng = StdRng::seed_from_u64(12);
        let cfg = BehaviorConfig::default();
        let mut b = BehaviorState::new(&mut rng);
        let mut blink_ticks = 0;
        for _ in 0..=cfg.blink_every {
            b.blink_tick(&cfg, &mut rng);
        }
        assert!(b.blinking());
        while b.blinking() {
            blink_ticks += 1;
            b.blink_tick(&cfg, &mut rng);
        }
        assert_eq!(blink_ticks, cfg.blink_ticks);
    }

    #[test]
    fn faces_follow_behaviour_and_tier() {
        assert_eq!(Behavior::Walking.face(Tier::Calm), Face::Happy);
        assert_eq!(Behavior::Walking.face(Tier::Neutral), Face::Mischievous);
        assert_eq!(Behavior::GameRequest.face(Tier::Calm), Face::Excited);
    }

    #[test]
    fn mischief_heads_up_and_right() {
        let mut rng = StdRng::seed_from_u64(13);
        let cfg = PhysicsConfig::default();
        let mut b = BehaviorState::new(&mut rng);
        b.set(Behavior::Mischief, 100, Face::Mischievous);
        let mut body = PetBody::new(Point::new(100.0, 500.0), 64.0, cfg.walk_speed);
        body.vx = -1.0;
        b.steer(&mut body, &cfg, Bounds::new(1000, 600), 0, &mut rng);
        assert!(body.vx > 0.0);
        assert!(body.vy < 0.0);
    }

    #[test]
    fn craving_never_goes_negative() {
        let mut c = Craving::default();
        c.grow(2.0);
        c.on_launch();
        assert_eq!(c.level(), 0.0);
        c.grow(1.2);
        assert!(c.exceeds(1.0));
        c.on_deny();
        assert!(!c.exceeds(1.0));
    }
}
