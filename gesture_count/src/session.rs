//! The timed alternation session: Pending → Won | Lost.

use std::time::{Duration, Instant};

use tracing::info;

use crate::counter::{AlternationCounter, Observation, DEFAULT_DWELL, DEFAULT_MIN_CONFIDENCE};
use crate::side::GestureSample;

// ════════════════════════════════════════════════════════════════════════════
// SessionConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Time allowed from start to deadline.
    pub duration:       Duration,
    /// Alternations needed to win.
    pub target:         u32,
    pub dwell:          Duration,
    pub min_confidence: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            duration:       Duration::from_secs(30),
            target:         10,
            dwell:          DEFAULT_DWELL,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SessionResult
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionResult {
    Pending,
    Won,
    Lost,
}

impl SessionResult {
    pub fn is_terminal(self) -> bool { self != SessionResult::Pending }
}

// ════════════════════════════════════════════════════════════════════════════
// GameSession
// ════════════════════════════════════════════════════════════════════════════

/// One round of the alternation game.  Once `result()` leaves `Pending` it
/// never changes again.
#[derive(Clone, Debug)]
pub struct GameSession {
    started:  Instant,
    deadline: Instant,
    target:   u32,
    counter:  AlternationCounter,
    result:   SessionResult,
    last:     Observation,
}

impl GameSession {
    pub fn new(config: SessionConfig, now: Instant) -> Self {
        GameSession {
            started:  now,
            deadline: now + config.duration,
            target:   config.target.max(1),
            counter:  AlternationCounter::new(config.dwell, config.min_confidence),
            result:   SessionResult::Pending,
            last:     Observation::Ignored,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn started(&self)  -> Instant       { self.started }
    pub fn deadline(&self) -> Instant       { self.deadline }
    pub fn target(&self)   -> u32           { self.target }
    pub fn count(&self)    -> u32           { self.counter.count() }
    pub fn result(&self)   -> SessionResult { self.result }
    pub fn counter(&self)  -> &AlternationCounter { &self.counter }
    /// What the most recent sample did.
    pub fn last_observation(&self) -> Observation { self.last }
    pub fn is_terminal(&self) -> bool { self.result.is_terminal() }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    // ── transitions ─────────────────────────────────────────────────────

    /// Feed one sample.  Samples stamped at or after the deadline resolve
    /// the session as lost before they can count.
    pub fn observe(&mut self, sample: GestureSample) -> SessionResult {
        if self.is_terminal() {
            return self.result;
        }
        if sample.at >= self.deadline {
            return self.resolve(SessionResult::Lost);
        }
        self.last = self.counter.observe(sample);
        self.check_target()
    }

    /// Manually credit one alternation (no camera available).
    pub fn simulate_alternation(&mut self, now: Instant) -> SessionResult {
        if self.is_terminal() {
            return self.result;
        }
        if now >= self.deadline {
            return self.resolve(SessionResult::Lost);
        }
        self.counter.credit();
        self.check_target()
    }

    /// The camera restarted or lost track: drop the half-finished hold.
    pub fn reset_hold(&mut self) {
        self.counter.reset_hold();
    }

    /// Advance the clock.  Resolves `Lost` once the deadline has passed.
    pub fn tick(&mut self, now: Instant) -> SessionResult {
        if !self.is_terminal() && now >= self.deadline {
            return self.resolve(SessionResult::Lost);
        }
        self.result
    }

    fn check_target(&mut self) -> SessionResult {
        if self.counter.count() >= self.target {
            return self.resolve(SessionResult::Won);
        }
        self.result
    }

    fn resolve(&mut self, result: SessionResult) -> SessionResult {
        info!(?result, count = self.counter.count(), target = self.target, "session resolved");
        self.result = result;
        result
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side::Side;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    /// Play `holds` alternating dwell-qualified holds starting with Left,
    /// each lasting `each`.  Returns the time after the last sample.
    fn play(s: &mut GameSession, t0: Instant, holds: usize, each: Duration) -> Instant {
        let mut t = t0;
        for i in 0..holds {
            let side = if i % 2 == 0 { Side::Left } else { Side::Right };
            s.observe(GestureSample::new(side, 1.0, t));
            s.observe(GestureSample::new(side, 1.0, t + each));
            t += each + ms(10);
        }
        t
    }

    #[test]
    fn ten_alternations_before_deadline_win() {
        let t0 = Instant::now();
        let mut s = GameSession::new(SessionConfig::default(), t0);
        play(&mut s, t0, 11, ms(1000));
        assert_eq!(s.count(), 10);
        assert_eq!(s.result(), SessionResult::Won);
    }

    #[test]
    fn nine_alternations_then_deadline_lose() {
        let t0 = Instant::now();
        let mut s = GameSession::new(SessionConfig::default(), t0);
        play(&mut s, t0, 10, ms(1000));
        assert_eq!(s.count(), 9);
        assert_eq!(s.tick(t0 + ms(29_999)), SessionResult::Pending);
        assert_eq!(s.tick(t0 + ms(30_000)), SessionResult::Lost);
    }

    #[test]
    fn result_is_sticky() {
        let t0 = Instant::now();
        let mut s = GameSession::new(SessionConfig::default(), t0);
        assert_eq!(s.tick(t0 + ms(31_000)), SessionResult::Lost);
        // Anything afterwards is too late.
        for _ in 0..20 { s.simulate_alternation(t0 + ms(31_000)); }
        assert_eq!(s.result(), SessionResult::Lost);

        let mut w = GameSession::new(SessionConfig::default(), t0);
        for _ in 0..10 { w.simulate_alternation(t0 + ms(100)); }
        assert_eq!(w.result(), SessionResult::Won);
        assert_eq!(w.tick(t0 + ms(60_000)), SessionResult::Won);
    }

    #[test]
    fn sample_at_deadline_loses_even_if_it_would_win() {
        let t0 = Instant::now();
        let cfg = SessionConfig { target: 1, ..SessionConfig::default() };
        let mut s = GameSession::new(cfg, t0);
        s.observe(GestureSample::new(Side::Left, 1.0, t0));
        s.observe(GestureSample::new(Side::Left, 1.0, t0 + ms(1000)));
        s.observe(GestureSample::new(Side::Right, 1.0, t0 + ms(29_000)));
        let r = s.observe(GestureSample::new(Side::Right, 1.0, t0 + ms(30_000)));
        assert_eq!(r, SessionResult::Lost);
        assert_eq!(s.count(), 0);
    }

    #[test]
    fn outcomes_are_exclusive_and_exhaustive() {
        // Sweep hold lengths: slow players lose, fast players win, nobody
        // ends up in both or neither once the deadline has passed.
        for each in (200..=3200).step_by(150) {
            let t0 = Instant::now();
            let mut s = GameSession::new(SessionConfig::default(), t0);
            play(&mut s, t0, 40, ms(each));
            let r = s.tick(t0 + ms(30_000));
            assert!(r.is_terminal());
            match r {
                SessionResult::Won  => assert!(s.count() >= 10),
                SessionResult::Lost => assert!(s.count() < 10),
                SessionResult::Pending => unreachable!(),
            }
        }
    }

    #[test]
    fn remaining_saturates() {
        let t0 = Instant::now();
        let s = GameSession::new(SessionConfig::default(), t0);
        assert_eq!(s.remaining(t0 + ms(10_000)), ms(20_000));
        assert_eq!(s.remaining(t0 + ms(90_000)), Duration::ZERO);
    }
}
