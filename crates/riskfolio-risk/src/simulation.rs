//! Monte Carlo Path Simulation
//!
//! Generates independent portfolio value paths whose daily volatility follows
//! a calibrated GARCH(1,1) recursion. For each simulated day:
//!
//! ε = σ(t) * z,  z ~ N(0, 1)
//! V(t+1) = V(t) * (1 + μ + ε)
//! σ²(t+1) = ω + α * ε² + β * σ²(t)
//!
//! where μ is the average historical daily return. Every path owns its own
//! generator, seeded from the run's base seed and the path index, so paths
//! are independent however rayon schedules them.

use crate::garch::GarchParams;
use crate::seed;
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default number of simulated paths.
pub const DEFAULT_ENSEMBLE_SIZE: usize = 10_000;

/// Monte Carlo configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of independent paths (default: 10,000)
    pub ensemble_size: usize,

    /// Seed for the per-path generators; drawn from entropy when `None`
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            ensemble_size: DEFAULT_ENSEMBLE_SIZE,
            seed: None,
        }
    }
}

/// Simulated portfolio value paths.
///
/// Each path starts with the initial capital and holds one value per
/// simulated day. Terminal values are kept aligned to path indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEnsemble {
    paths: Vec<Vec<f64>>,
    terminal_values: Vec<f64>,
}

impl SimulationEnsemble {
    /// Build an ensemble from complete paths.
    pub fn from_paths(paths: Vec<Vec<f64>>) -> Self {
        let terminal_values = paths
            .iter()
            .map(|path| path.last().copied().unwrap_or_default())
            .collect();
        Self {
            paths,
            terminal_values,
        }
    }

    /// All paths.
    pub fn paths(&self) -> &[Vec<f64>] {
        &self.paths
    }

    /// Path at `index`.
    pub fn path(&self, index: usize) -> Option<&[f64]> {
        self.paths.get(index).map(Vec::as_slice)
    }

    /// Final value of every path, in path order.
    pub fn terminal_values(&self) -> &[f64] {
        &self.terminal_values
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the ensemble holds no paths.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of simulated days per path.
    pub fn horizon(&self) -> usize {
        self.paths
            .first()
            .map_or(0, |path| path.len().saturating_sub(1))
    }

    /// Mean terminal value, 0 for an empty ensemble.
    pub fn mean_terminal_value(&self) -> f64 {
        if self.terminal_values.is_empty() {
            return 0.0;
        }
        self.terminal_values.iter().sum::<f64>() / self.terminal_values.len() as f64
    }
}

/// GARCH-driven Monte Carlo simulator.
#[derive(Debug, Default)]
pub struct MonteCarloSimulator {
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    /// Create a simulator with the given configuration.
    pub const fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Simulate the ensemble.
    ///
    /// # Arguments
    /// * `capital` - Starting portfolio value
    /// * `horizon` - Number of days to simulate
    /// * `drift` - Average daily return added to every day's shock
    /// * `params` - Calibrated variance model
    pub fn simulate(
        &self,
        capital: f64,
        horizon: usize,
        drift: f64,
        params: &GarchParams,
    ) -> SimulationEnsemble {
        let base_seed = seed::base_seed(self.config.seed);

        debug!(
            paths = self.config.ensemble_size,
            horizon, capital, drift, "simulating value paths"
        );

        let paths: Vec<Vec<f64>> = (0..self.config.ensemble_size)
            .into_par_iter()
            .map(|trial| {
                let mut rng = seed::trial_rng(base_seed, trial);
                simulate_path(&mut rng, capital, horizon, drift, params)
            })
            .collect();

        let ensemble = SimulationEnsemble::from_paths(paths);
        info!(
            paths = ensemble.len(),
            mean_terminal = ensemble.mean_terminal_value(),
            "Monte Carlo simulation finished"
        );
        ensemble
    }
}

/// Simulate one value path of `horizon` days starting at `capital`.
///
/// The returned path has `horizon + 1` values, the first being `capital`.
pub fn simulate_path<R: Rng>(
    rng: &mut R,
    capital: f64,
    horizon: usize,
    drift: f64,
    params: &GarchParams,
) -> Vec<f64> {
    let mut path = Vec::with_capacity(horizon + 1);
    let mut price = capital;
    let mut variance = params.initial_variance;
    path.push(price);

    for _ in 0..horizon {
        let z: f64 = rng.sample(StandardNormal);
        let shock = variance.sqrt() * z;

        price *= 1.0 + drift + shock;
        path.push(price);

        variance = params.next_variance(shock, variance);
    }

    path
}
