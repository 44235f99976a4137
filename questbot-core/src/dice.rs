//! Dice rolling port.
//!
//! Combat never touches a global RNG: a [`DiceRoller`] is injected wherever
//! a roll is needed, so the same sequence of faces always yields the same
//! fight.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of die faces.
pub trait DiceRoller: Send + Sync {
    /// Roll a die with `sides` faces, returning a value in `1..=sides`.
    fn roll(&self, sides: u32) -> u32;
}

/// Uniform dice backed by a seedable `StdRng`.
pub struct StdDice {
    rng: Mutex<StdRng>,
}

impl StdDice {
    /// Dice seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Dice with a fixed seed; two instances with the same seed roll alike.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for StdDice {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for StdDice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdDice").finish_non_exhaustive()
    }
}

impl DiceRoller for StdDice {
    fn roll(&self, sides: u32) -> u32 {
        self.rng.lock().gen_range(1..=sides.max(1))
    }
}

/// Replays a fixed sequence of faces, in order.
///
/// Faces are clamped into `1..=sides` at roll time. Once the script runs
/// out every roll returns 1.
#[derive(Debug, Default)]
pub struct ScriptedDice {
    faces: Mutex<VecDeque<u32>>,
}

impl ScriptedDice {
    /// Script the given faces.
    #[must_use]
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: Mutex::new(faces.into_iter().collect()),
        }
    }

    /// Append more faces to the end of the script.
    pub fn push(&self, faces: impl IntoIterator<Item = u32>) {
        self.faces.lock().extend(faces);
    }

    /// Faces not yet rolled.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.faces.lock().len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&self, sides: u32) -> u32 {
        let face = self.faces.lock().pop_front().unwrap_or(1);
        face.clamp(1, sides.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_dice_stay_in_range() {
        let dice = StdDice::seeded(7);
        for _ in 0..1000 {
            let face = dice.roll(6);
            assert!((1..=6).contains(&face));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = StdDice::seeded(1234);
        let b = StdDice::seeded(1234);
        let left: Vec<u32> = (0..32).map(|_| a.roll(6)).collect();
        let right: Vec<u32> = (0..32).map(|_| b.roll(6)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn scripted_dice_replay_in_order() {
        let dice = ScriptedDice::new([6, 1, 3]);
        assert_eq!(dice.roll(6), 6);
        assert_eq!(dice.roll(6), 1);
        assert_eq!(dice.remaining(), 1);
        assert_eq!(dice.roll(6), 3);
        // Exhausted script falls back to the lowest face.
        assert_eq!(dice.roll(6), 1);
    }

    #[test]
    fn scripted_faces_are_clamped() {
        let dice = ScriptedDice::new([0, 9]);
        assert_eq!(dice.roll(6), 1);
        assert_eq!(dice.roll(6), 6);
    }
}
