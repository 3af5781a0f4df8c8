use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Mutex;

use super::DICE_FACES;

/// Source of dice rolls for the turn engine
pub trait DiceRoller: Send + Sync + Debug {
    /// Roll one die, returning a value in `1..=6`
    fn roll(&self) -> u8;
}

/// Uniform rolls from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomDice;

impl DiceRoller for RandomDice {
    fn roll(&self) -> u8 {
        rand::thread_rng().gen_range(1..=DICE_FACES)
    }
}

/// Uniform rolls from a seeded RNG, reproducible across runs
#[derive(Debug)]
pub struct SeededDice {
    rng: Mutex<StdRng>,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl DiceRoller for SeededDice {
    fn roll(&self) -> u8 {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(1..=DICE_FACES),
            Err(poisoned) => poisoned.into_inner().gen_range(1..=DICE_FACES),
        }
    }
}

/// Replays a fixed list of rolls, then falls back to the last one
///
/// Values outside `1..=6` are clamped into range.
#[derive(Debug)]
pub struct ScriptedDice {
    rolls: Mutex<VecDeque<u8>>,
    last: Mutex<u8>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            rolls: Mutex::new(
                rolls
                    .into_iter()
                    .map(|r| r.clamp(1, DICE_FACES))
                    .collect(),
            ),
            last: Mutex::new(1),
        }
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&self) -> u8 {
        let next = self.rolls.lock().ok().and_then(|mut rolls| rolls.pop_front());
        let Ok(mut last) = self.last.lock() else {
            return next.unwrap_or(1);
        };
        if let Some(roll) = next {
            *last = roll;
        }
        *last
    }
}
