//! Keyboard map for the pet window and the game windows.

use minifb::Key;
use pet_games::{GameInput, GameKind};

use crate::follow::FollowMode;

/// A command from the pet window's keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PetKey {
    /// `I`, `O`, `G`
    RequestGame,
    /// `P`
    InstantLaunch,
    /// `Y`
    Accept,
    /// `N`
    Deny,
    /// `1`, `2`, `3`
    Launch(GameKind),
    /// `Q` stalk, `W` grab, `E` lock, `R` release
    Follow(FollowMode),
    /// `T`
    CycleFollow,
    /// `A`
    RaiseAnnoyance,
    /// `S`
    LowerAnnoyance,
    /// `H`
    Help,
    /// `L`
    Speak,
    /// `Escape`
    Quit,
}

pub const HELP: &str = "KEYS: I/O/G request game | P instant game | Y accept | N deny | \
                        1 matcha | 2 hands | 3 runaway | Q stalk | W grab | E lock | R release | \
                        T cycle | A annoy+ | S annoy- | L speak | H help | Esc quit";

pub const PET_KEYS: &[Key] = &[
    Key::I, Key::O, Key::G, Key::P, Key::Y, Key::N,
    Key::Key1, Key::Key2, Key::Key3,
    Key::Q, Key::W, Key::E, Key::R, Key::T,
    Key::A, Key::S, Key::H, Key::L, Key::Escape,
];

pub fn pet_key(key: Key) -> Option<PetKey> {
    let k = match key {
        Key::I | Key::O | Key::G => PetKey::RequestGame,
        Key::P      => PetKey::InstantLaunch,
        Key::Y      => PetKey::Accept,
        Key::N      => PetKey::Deny,
        Key::Key1   => PetKey::Launch(GameKind::MatchaWhisking),
        Key::Key2   => PetKey::Launch(GameKind::HandAlternator),
        Key::Key3   => PetKey::Launch(GameKind::ImpossibleClick),
        Key::Q      => PetKey::Follow(FollowMode::Stalk),
        Key::W      => PetKey::Follow(FollowMode::Grab),
        Key::E      => PetKey::Follow(FollowMode::Lock),
        Key::R      => PetKey::Follow(FollowMode::Idle),
        Key::T      => PetKey::CycleFollow,
        Key::A      => PetKey::RaiseAnnoyance,
        Key::S      => PetKey::LowerAnnoyance,
        Key::H      => PetKey::Help,
        Key::L      => PetKey::Speak,
        Key::Escape => PetKey::Quit,
        _           => return None,
    };
    Some(k)
}

pub const GAME_KEYS: &[Key] = &[Key::Space, Key::C];

/// Keys understood by a game window.  Only the hand game reacts to them.
pub fn game_key(key: Key) -> Option<GameInput> {
    match key {
        Key::Space => Some(GameInput::Simulate),
        Key::C     => Some(GameInput::RetryCamera),
        _          => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_pet_key_maps() {
        for &k in PET_KEYS {
            assert!(pet_key(k).is_some(), "{k:?}");
        }
        assert_eq!(pet_key(Key::Z), None);
    }

    #[test]
    fn request_keys_share_a_command() {
        assert_eq!(pet_key(Key::I), pet_key(Key::G));
        assert_eq!(pet_key(Key::O), Some(PetKey::RequestGame));
    }

    #[test]
    fn hijack_keys() {
        assert_eq!(pet_key(Key::Q), Some(PetKey::Follow(FollowMode::Stalk)));
        assert_eq!(pet_key(Key::E), Some(PetKey::Follow(FollowMode::Lock)));
        assert_eq!(pet_key(Key::R), Some(PetKey::Follow(FollowMode::Idle)));
    }

    #[test]
    fn game_window_keys() {
        assert_eq!(game_key(Key::Space), Some(GameInput::Simulate));
        assert_eq!(game_key(Key::C), Some(GameInput::RetryCamera));
        assert_eq!(game_key(Key::Y), None);
        for &k in GAME_KEYS {
            assert!(game_key(k).is_some());
        }
    }
}
