use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::spot::Level;

/// A source of the random choices the directory makes: cleanliness
/// levels for new spots, position jitter and the seed coin flips.
pub trait Entropy: Send {
    /// Returns a value uniformly drawn from `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Returns an index uniformly drawn from `0..len`. `len` must be
    /// non-zero.
    fn index(&mut self, len: usize) -> usize;

    fn level(&mut self) -> Level {
        Level::ALL[self.index(Level::ALL.len())]
    }

    fn coin(&mut self) -> bool {
        self.unit() >= 0.5
    }

    /// Returns an offset uniformly drawn from `[-magnitude, magnitude)`.
    fn jitter(&mut self, magnitude: f64) -> f64 {
        (self.unit() * 2.0 - 1.0) * magnitude
    }
}

/// Entropy backed by a standard PRNG.
pub struct RandomEntropy {
    rng: StdRng,
}

impl RandomEntropy {
    /// Seeds from the operating system.
    pub fn from_os() -> Self {
        RandomEntropy {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeds deterministically, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        RandomEntropy {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_else(Self::from_os)
    }
}

impl Entropy for RandomEntropy {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Entropy that replays a fixed script of unit values. Once the script
/// runs out it keeps returning the last value (or `0.0` if it was
/// empty).
#[derive(Clone, Debug, Default)]
pub struct ScriptedEntropy {
    script: VecDeque<f64>,
    last: f64,
}

impl ScriptedEntropy {
    pub fn new(script: impl IntoIterator<Item = f64>) -> Self {
        ScriptedEntropy {
            script: script.into_iter().collect(),
            last: 0.0,
        }
    }

    /// A script that yields `levels` in order when asked for levels.
    /// Each level maps to the middle of its bucket.
    pub fn with_levels(levels: impl IntoIterator<Item = Level>) -> Self {
        Self::new(levels.into_iter().map(|level| {
            let position = Level::ALL
                .iter()
                .position(|l| *l == level)
                .unwrap_or_default();
            (position as f64 + 0.5) / Level::ALL.len() as f64
        }))
    }
}

impl Entropy for ScriptedEntropy {
    fn unit(&mut self) -> f64 {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }

        self.last
    }

    fn index(&mut self, len: usize) -> usize {
        let scaled = (self.unit() * len as f64) as usize;
        scaled.min(len - 1)
    }
}
