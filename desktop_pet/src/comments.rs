//! What the pet says, and how often it volunteers something.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::mood::Tier;

pub const FRIENDLY: &[&str] = &[
    "Hi there!",
    "Just taking a stroll around your desktop!",
    "Hope you're having a productive day!",
    "Nice desktop setup!",
    "Just stretching my digital legs!",
    "Don't mind me, just walking around!",
    "Your screen looks great today!",
    "I'm your friendly desktop companion!",
];

pub const ANNOYING: &[&str] = &[
    "Hey! Are you actually working?",
    "Maybe take a break? You look stressed!",
    "Oops! Did I do that?",
    "Let me control your mouse for a second...",
    "Your mouse is mine now!",
    "I'm coming for your cursor!",
    "Time to lock your cursor in place!",
    "You should have let me play games!",
    "This is what happens when I don't get to play!",
    "Games would have kept me peaceful...",
    "I warned you I'd get annoying without games!",
];

pub const GAME_REQUEST: &[&str] = &[
    "Hey! Want to play a game with me?",
    "I'm bored! Can we play something fun?",
    "Games are fun! Let's play one!",
    "I know some cool games we could try!",
    "Please please please can we play a game?",
    "I promise it'll be fun! Just one game?",
    "I'm getting lonely... want to play?",
];

pub const MANUAL_REQUEST: &[&str] = &[
    "Oh! You want to play RIGHT NOW? Let's do it!",
    "Manual game request detected! I LOVE the enthusiasm!",
    "You pressed the magic button! Game time!",
    "You summoned me for games! EXCELLENT!",
    "Bypassing cooldowns for manual request! Let's GO!",
];

pub const DENIED: &[&str] = &[
    "Aww, no games? That's disappointing...",
    "But games are fun! Why not?",
    "Fine, I'll just have to entertain myself...",
    "No games means I get more mischievous!",
    "Your loss! Games keep me calm...",
    "I might get more annoying without games...",
];

pub const IGNORED: &[&str] = &[
    "Hello? I asked you something!",
    "Fine, don't answer. I'll remember this.",
    "Ignoring me? Bold move.",
];

pub const FAILURE: &[&str] = &[
    "You FAILED that game! Now I'm REALLY annoyed!",
    "That's what happens when you lose! CHAOS TIME!",
    "You're terrible at games! Time for punishment!",
    "Can't even win a simple game... pathetic!",
    "I'm SO disappointed in your gaming skills!",
    "You keep failing! I keep getting MORE evil!",
];

pub const VICTORY: &[&str] = &[
    "Yay! You won! I'm so proud!",
    "Great job! Maybe I'll be nice for a while...",
    "Victory! That was actually impressive!",
    "Winner winner! I'll behave myself... for now.",
    "Success! I'm feeling much calmer now...",
    "You won! Time for me to be a good pet!",
];

pub const RESTING: &[&str] = &[
    "Just resting my eyes...",
    "This is exhausting work!",
    "Maybe I should do something...",
];

pub const MISCHIEF: &[&str] = &[
    "Time to take control of your mouse!",
    "Heading to my favorite corner!",
    "Your mouse cursor will be mine!",
    "Almost at the danger zone...",
];

/// One line from `lines`, or an ellipsis for an empty list.
pub fn pick<R: Rng + ?Sized>(rng: &mut R, lines: &[&'static str]) -> &'static str {
    lines.choose(rng).copied().unwrap_or("...")
}

/// The pool for an unprompted comment.
pub fn idle_lines(tier: Tier) -> &'static [&'static str] {
    match tier {
        Tier::Calm => FRIENDLY,
        _          => ANNOYING,
    }
}

/// Gate for unprompted comments: a cooldown drawn from the tier's range,
/// then a small per-tick chance.
#[derive(Clone, Debug)]
pub struct CommentClock {
    next_allowed: Instant,
}

impl CommentClock {
    /// First comment allowed after `initial`.
    pub fn new(now: Instant, initial: Duration) -> Self {
        CommentClock { next_allowed: now + initial }
    }

    /// True when a comment should be made now; restarts the cooldown.
    pub fn should_comment<R: Rng + ?Sized>(&mut self, tier: Tier, now: Instant, rng: &mut R) -> bool {
        if now < self.next_allowed || !rng.gen_bool(tier.comment_chance()) {
            return false;
        }
        self.restart(tier, now, rng);
        true
    }

    /// Restart the cooldown after any comment, prompted or not.
    pub fn restart<R: Rng + ?Sized>(&mut self, tier: Tier, now: Instant, rng: &mut R) {
        let (lo, hi) = tier.comment_cooldown_secs();
        self.next_allowed = now + Duration::from_secs(rng.gen_range(lo..=hi));
    }

    pub fn next_allowed(&self) -> Instant { self.next_allowed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn calm_pets_are_friendly() {
        assert_eq!(idle_lines(Tier::Calm), FRIENDLY);
        assert_eq!(idle_lines(Tier::MaxChaos), ANNOYING);
    }

    #[test]
    fn nothing_is_said_during_the_cooldown() {
        let mut rng = StdRng::seed_from_u64(1);
        let t0 = Instant::now();
        let mut clock = CommentClock::new(t0, Duration::from_secs(15));
        for i in 0..10_000u64 {
            assert!(!clock.should_comment(Tier::MaxChaos, t0 + Duration::from_millis(i), &mut rng));
        }
    }

    #[test]
    fn comment_restarts_the_cooldown_from_the_tier_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let t0 = Instant::now();
        let mut clock = CommentClock::new(t0, Duration::ZERO);
        let mut tick = 0u64;
        let said_at = loop {
            let now = t0 + Duration::from_millis(tick * 16);
            if clock.should_comment(Tier::Aggressive, now, &mut rng) {
                break now;
            }
            tick += 1;
            assert!(tick < 100_000, "never commented");
        };
        let wait = clock.next_allowed() - said_at;
        assert!((Duration::from_secs(10)..=Duration::from_secs(25)).contains(&wait), "{wait:?}");
    }

    #[test]
    fn pick_handles_empty_lists() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(pick(&mut rng, &[]), "...");
        assert!(VICTORY.contains(&pick(&mut rng, VICTORY)));
    }
}
