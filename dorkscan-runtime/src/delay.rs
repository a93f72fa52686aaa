//! Delay scheduling between dork searches
//!
//! A pool of randomized delays is generated once per run and drawn from at
//! random between consecutive searches.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use dorkscan_core::DELAY_POOL_SIZE;

/// Generate `DELAY_POOL_SIZE` delays uniformly in `[min, max]`, rounded to
/// one decimal and sorted ascending.
pub fn generate_pool<R: Rng>(min: f64, max: f64, rng: &mut R) -> Vec<f64> {
    let mut pool: Vec<f64> = (0..DELAY_POOL_SIZE)
        .map(|_| round_tenths(rng.gen_range(min..=max)))
        .collect();
    pool.sort_by(f64::total_cmp);
    pool
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Owns the delay pool and the seeded random source that draws from it
#[derive(Debug, Clone)]
pub struct DelayScheduler {
    pool: Vec<f64>,
    rng: StdRng,
}

impl DelayScheduler {
    /// Build a scheduler for validated bounds (`0 <= min < max`).
    ///
    /// With a seed the pool and every draw are reproducible.
    pub fn new(min: f64, max: f64, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pool = generate_pool(min, max, &mut rng);
        Self { pool, rng }
    }

    pub fn pool(&self) -> &[f64] {
        &self.pool
    }

    /// Pick one delay (seconds) uniformly from the pool
    pub fn draw(&mut self) -> f64 {
        self.pool.choose(&mut self.rng).copied().unwrap_or(0.0)
    }
}
