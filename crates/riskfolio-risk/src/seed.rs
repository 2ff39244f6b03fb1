//! Seeding of per-trial random number generators.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Base seed for a run: the configured one, or a fresh one from entropy.
pub(crate) fn base_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// Independent generator owned by a single trial.
pub(crate) fn trial_rng(base_seed: u64, trial: usize) -> StdRng {
    StdRng::seed_from_u64(base_seed.wrapping_add(trial as u64))
}
