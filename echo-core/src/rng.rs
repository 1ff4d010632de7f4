//! Seeded random source for dungeon generation, loot and combat.
//!
//! Every randomized decision in the engine is a uniform draw in `[0, 1)`,
//! so a game is fully reproducible from its seed. Tests can queue explicit
//! draws that are consumed before the seeded stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Game random number generator.
///
/// Wraps `ChaCha8Rng`. Only the seed is serialized; deserializing
/// restarts the stream from that seed.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
    scripted: VecDeque<f64>,
}

impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

impl GameRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            scripted: VecDeque::new(),
        }
    }

    /// Create a new RNG with a random seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Create an RNG that returns `draws` first, then continues from seed 0.
    pub fn scripted(draws: impl IntoIterator<Item = f64>) -> Self {
        let mut rng = Self::new(0);
        rng.push_draws(draws);
        rng
    }

    /// The seed used to create this RNG.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Queue explicit draws to be returned before the seeded stream.
    pub fn push_draws(&mut self, draws: impl IntoIterator<Item = f64>) {
        self.scripted.extend(draws);
    }

    /// Number of queued draws not yet consumed.
    pub fn pending_draws(&self) -> usize {
        self.scripted.len()
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        match self.scripted.pop_front() {
            Some(draw) => draw.clamp(0.0, 1.0 - f64::EPSILON),
            None => self.rng.gen::<f64>(),
        }
    }

    /// Returns true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform index in `0..len`. Returns 0 for an empty range.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Choose a random element from a slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.index(items.len())])
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
