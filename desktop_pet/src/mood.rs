//! Annoyance and the tier it selects.
//!
//! `annoyance` is only written through [`MoodState::apply_key`] (the pet's
//! key handler) and [`MoodState::apply_result`] (a finished game).  Both clamp
//! to `[floor, ceiling]`.
//!
//! | Tier | Default range | Effect |
//! |---|---|---|
//! | Calm | 0–1 | friendly lines, rare comments, game requests favoured |
//! | Neutral | 2–5 | some mischief |
//! | Aggressive | 6–11 | faster cursor hijacks, frequent comments |
//! | MaxChaos | ≥ 12 | no game requests, mostly chaos |

use std::fmt;

use pet_games::GameOutcome;

use crate::config::MoodConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier { Calm, Neutral, Aggressive, MaxChaos }

impl Tier {
    /// Multiplier on the cursor-follow step.
    pub fn hijack_scale(self) -> f32 {
        match self {
            Tier::Calm       => 0.75,
            Tier::Neutral    => 1.0,
            Tier::Aggressive => 1.3,
            Tier::MaxChaos   => 1.6,
        }
    }

    /// Per-tick chance of an unprompted comment once the cooldown is over.
    pub fn comment_chance(self) -> f64 {
        match self {
            Tier::Calm => 0.002,
            _          => 0.01,
        }
    }

    /// Seconds between unprompted comments, as an inclusive range.
    pub fn comment_cooldown_secs(self) -> (u64, u64) {
        match self {
            Tier::Calm => (30, 60),
            _          => (10, 25),
        }
    }

    /// Console prefix for everything the pet says.
    pub fn voice_prefix(self) -> &'static str {
        match self {
            Tier::Calm => "FRIENDLY",
            _          => "EVIL",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Calm       => "calm",
            Tier::Neutral    => "neutral",
            Tier::Aggressive => "aggressive",
            Tier::MaxChaos   => "max-chaos",
        };
        f.write_str(s)
    }
}

/// Annoyance changes the key handler may make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoodKey {
    /// `A`
    Raise,
    /// `S`
    Lower,
    /// `N` on a pending game request
    Deny,
}

#[derive(Clone, Debug)]
pub struct MoodState {
    annoyance: i32,
    config:    MoodConfig,
}

impl MoodState {
    pub fn new(config: MoodConfig) -> Self {
        let mut config = config;
        if config.ceiling < config.floor {
            config.ceiling = config.floor;
        }
        let annoyance = config.start.clamp(config.floor, config.ceiling);
        MoodState { annoyance, config }
    }

    pub fn annoyance(&self) -> i32 { self.annoyance }
    pub fn floor(&self)     -> i32 { self.config.floor }
    pub fn ceiling(&self)   -> i32 { self.config.ceiling }

    pub fn tier(&self) -> Tier {
        let c = &self.config;
        match self.annoyance {
            a if a >= c.chaos_at      => Tier::MaxChaos,
            a if a >= c.aggressive_at => Tier::Aggressive,
            a if a >= c.neutral_at    => Tier::Neutral,
            _                         => Tier::Calm,
        }
    }

    /// Returns the new annoyance.
    pub fn apply_key(&mut self, key: MoodKey) -> i32 {
        let delta = match key {
            MoodKey::Raise => self.config.raise_delta,
            MoodKey::Lower => -self.config.lower_delta,
            MoodKey::Deny  => self.config.deny_delta,
        };
        self.shift(delta)
    }

    /// Returns the new annoyance.
    pub fn apply_result(&mut self, outcome: GameOutcome) -> i32 {
        let delta = match outcome {
            GameOutcome::Won  => -self.config.won_delta,
            GameOutcome::Lost => self.config.lost_delta,
        };
        self.shift(delta)
    }

    fn shift(&mut self, delta: i32) -> i32 {
        self.annoyance = self
            .annoyance
            .saturating_add(delta)
            .clamp(self.config.floor, self.config.ceiling);
        self.annoyance
    }
}

impl Default for MoodState {
    fn default() -> Self { MoodState::new(MoodConfig::default()) }
}

// ════════════════════════════════════════════════════════════════════════════
// GameStats
// ════════════════════════════════════════════════════════════════════════════

/// Running tally of game requests and results.  Feeds behaviour weights, not
/// annoyance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameStats {
    pub won:                  u32,
    pub lost:                 u32,
    pub denied:               u32,
    pub timed_out:            u32,
    pub consecutive_failures: u32,
}

impl GameStats {
    pub fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Won => {
                self.won += 1;
                self.consecutive_failures = 0;
            }
            GameOutcome::Lost => {
                self.lost += 1;
                self.consecutive_failures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_neutral() {
        let m = MoodState::default();
        assert_eq!(m.annoyance(), 2);
        assert_eq!(m.tier(), Tier::Neutral);
    }

    #[test]
    fn results_move_by_fixed_deltas() {
        let mut m = MoodState::new(MoodConfig { start: 8, ..MoodConfig::default() });
        assert_eq!(m.apply_result(GameOutcome::Won), 5);
        assert_eq!(m.apply_result(GameOutcome::Lost), 8);
    }

    #[test]
    fn repeated_wins_reach_the_floor_and_stay() {
        let mut m = MoodState::new(MoodConfig { start: 13, ..MoodConfig::default() });
        for _ in 0..20 {
            let a = m.apply_result(GameOutcome::Won);
            assert!((m.floor()..=m.ceiling()).contains(&a));
        }
        assert_eq!(m.annoyance(), 0);
        assert_eq!(m.tier(), Tier::Calm);
    }

    #[test]
    fn repeated_losses_reach_the_ceiling_and_stay() {
        let mut m = MoodState::default();
        for _ in 0..20 {
            let a = m.apply_result(GameOutcome::Lost);
            assert!((m.floor()..=m.ceiling()).contains(&a));
        }
        assert_eq!(m.annoyance(), 20);
        assert_eq!(m.tier(), Tier::MaxChaos);
    }

    #[test]
    fn keys_apply_their_deltas() {
        let mut m = MoodState::default();
        assert_eq!(m.apply_key(MoodKey::Raise), 4);
        assert_eq!(m.apply_key(MoodKey::Deny), 5);
        assert_eq!(m.apply_key(MoodKey::Lower), 2);
        assert_eq!(m.apply_key(MoodKey::Lower), 0);
    }

    #[test]
    fn tiers_follow_thresholds() {
        let tier_at = |start| MoodState::new(MoodConfig { start, ..MoodConfig::default() }).tier();
        assert_eq!(tier_at(0), Tier::Calm);
        assert_eq!(tier_at(1), Tier::Calm);
        assert_eq!(tier_at(5), Tier::Neutral);
        assert_eq!(tier_at(6), Tier::Aggressive);
        assert_eq!(tier_at(11), Tier::Aggressive);
        assert_eq!(tier_at(12), Tier::MaxChaos);
        assert_eq!(tier_at(99), Tier::MaxChaos);
        assert!(Tier::Calm < Tier::MaxChaos);
    }

    #[test]
    fn inverted_range_is_repaired() {
        let m = MoodState::new(MoodConfig { floor: 5, ceiling: 1, start: 3, ..MoodConfig::default() });
        assert_eq!((m.floor(), m.ceiling(), m.annoyance()), (5, 5, 5));
    }

    #[test]
    fn stats_track_failure_streaks() {
        let mut s = GameStats::default();
        s.record(GameOutcome::Lost);
        s.record(GameOutcome::Lost);
        assert_eq!(s.consecutive_failures, 2);
        s.record(GameOutcome::Won);
        assert_eq!((s.won, s.lost, s.consecutive_failures), (1, 2, 0));
    }
}
