//! The seeded random source shared by the point generator and the engines.
//!
//! All randomness of a run flows through one [RandomSource]: the generator state is derived
//! only from a string key, so reseeding with the same key replays the same draws.
//! Nothing in the crate reads system entropy.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;
use sha2::{Digest, Sha256};

/// key every engine reseeds with at start
pub const DEFAULT_SEED: &str = "unsupervised-learning-viz";

/// Deterministic generator reset from a string key.
#[derive(Debug, Clone)]
pub struct RandomSource {
    key: String,
    rng: Xoshiro256PlusPlus,
    // number of draws since last seed, for debugging replays
    nb_draws: u64,
}

impl RandomSource {
    /// a source seeded with key
    pub fn new(key: &str) -> Self {
        RandomSource {
            key: key.to_string(),
            rng: Self::rng_from_key(key),
            nb_draws: 0,
        }
    }

    // the 256 bits of state are the sha256 of the key
    fn rng_from_key(key: &str) -> Xoshiro256PlusPlus {
        let digest = Sha256::digest(key.as_bytes());
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);
        Xoshiro256PlusPlus::from_seed(seed)
    }

    /// reset generator to the state derived from key
    pub fn seed(&mut self, key: &str) {
        log::debug!("reseeding random source with key {:?}", key);
        self.key = key.to_string();
        self.rng = Self::rng_from_key(key);
        self.nb_draws = 0;
    }

    /// returns the key of last seeding
    pub fn get_key(&self) -> &str {
        &self.key
    }

    /// number of draws since last seeding
    pub fn get_nb_draws(&self) -> u64 {
        self.nb_draws
    }

    /// a float uniform in [0,1)
    pub fn next_f64(&mut self) -> f64 {
        self.nb_draws += 1;
        self.rng.random::<f64>()
    }

    /// floor(next * n), an index uniform in 0..n.
    ///
    /// # Panics
    ///
    /// if n is 0, the range 0..n being empty.
    pub fn index_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "index_below needs a non empty range");
        let idx = (self.next_f64() * n as f64).floor() as usize;
        // guard against rounding up to n
        idx.min(n - 1)
    }

    /// a N(0,1) sample
    pub fn standard_normal(&mut self) -> f64 {
        self.nb_draws += 1;
        StandardNormal.sample(&mut self.rng)
    }

    /// Fisher-Yates shuffle, walking from the end of the slice
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        let mut current = items.len();
        while current != 0 {
            let picked = self.index_below(current);
            current -= 1;
            items.swap(current, picked);
        }
    }
} // end of impl RandomSource

impl Default for RandomSource {
    fn default() -> Self {
        RandomSource::new(DEFAULT_SEED)
    }
}

//========================================================

// end of mod tests
