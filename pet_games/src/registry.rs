//! Which games exist and how to build them.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::click::ImpossibleClick;
use crate::game::{ActiveGame, GameKind};
use crate::hand::{HandAlternator, HandConfig};
use crate::matcha::MatchaWhisking;

pub struct GameRegistry {
    kinds: Vec<GameKind>,
    hand:  HandConfig,
}

impl GameRegistry {
    /// All games, with the hand game using `hand` for its camera.
    pub fn new(hand: HandConfig) -> Self {
        GameRegistry { kinds: GameKind::ALL.to_vec(), hand }
    }

    /// Restrict the random pool.  An empty list keeps the full set.
    pub fn with_kinds(mut self, kinds: &[GameKind]) -> Self {
        if !kinds.is_empty() {
            self.kinds = kinds.to_vec();
        }
        self
    }

    pub fn kinds(&self) -> &[GameKind] { &self.kinds }

    pub fn hand_config(&self) -> &HandConfig { &self.hand }

    pub fn random_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> GameKind {
        self.kinds.choose(rng).copied().unwrap_or(GameKind::MatchaWhisking)
    }

    /// A fresh, not yet started game.
    pub fn create<R: Rng + ?Sized>(&self, kind: GameKind, rng: &mut R) -> ActiveGame {
        match kind {
            GameKind::MatchaWhisking  => ActiveGame::Matcha(MatchaWhisking::default()),
            GameKind::HandAlternator  => ActiveGame::Hand(HandAlternator::new(self.hand.clone())),
            GameKind::ImpossibleClick => {
                ActiveGame::Click(ImpossibleClick::new(StdRng::seed_from_u64(rng.gen())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pet_camera::{CameraError, CameraOpener};

    fn registry() -> GameRegistry {
        let opener: CameraOpener = Arc::new(|| Err(CameraError::Unavailable));
        GameRegistry::new(HandConfig::new(opener))
    }

    #[test]
    fn random_kind_stays_in_the_pool() {
        let mut rng = StdRng::seed_from_u64(42);
        let r = registry().with_kinds(&[GameKind::ImpossibleClick]);
        for _ in 0..20 {
            assert_eq!(r.random_kind(&mut rng), GameKind::ImpossibleClick);
        }
    }

    #[test]
    fn random_kind_covers_all_games() {
        let mut rng = StdRng::seed_from_u64(42);
        let r = registry();
        let mut seen: Vec<GameKind> = (0..200).map(|_| r.random_kind(&mut rng)).collect();
        seen.sort_by_key(|k| *k as u8);
        seen.dedup();
        assert_eq!(seen, GameKind::ALL.to_vec());
    }

    #[test]
    fn create_builds_the_requested_kind() {
        let mut rng = StdRng::seed_from_u64(1);
        let r = registry();
        for kind in GameKind::ALL {
            assert_eq!(r.create(kind, &mut rng).kind(), kind);
        }
    }
}
