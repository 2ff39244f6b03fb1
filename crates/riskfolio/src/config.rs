//! Simulation request configuration.

use riskfolio_data::ProxyConfig;
use riskfolio_risk::{CalibrationConfig, simulation::DEFAULT_ENSEMBLE_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed distance between the weight sum and 1.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

/// Mixed into the run seed to derive the calibration seed.
pub const CALIBRATION_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Default confidence level of the tail metrics.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Request validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No instruments were given
    #[error("portfolio has no instruments")]
    EmptyPortfolio,

    /// Weights and instruments differ in number
    #[error("{weights} weights given for {symbols} instruments")]
    WeightCount {
        /// Number of instruments
        symbols: usize,
        /// Number of weights
        weights: usize,
    },

    /// Weights do not sum to 1
    #[error("weights sum to {sum:.4}, expected 1 (±0.01)")]
    WeightSum {
        /// Actual sum
        sum: f64,
    },

    /// Capital is zero, negative or not finite
    #[error("capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    /// Horizon of zero days
    #[error("horizon must be at least one day")]
    ZeroHorizon,

    /// History shorter than a year
    #[error("history must cover at least one year, got {0}")]
    HistoryYears(u32),

    /// Confidence outside (0, 1)
    #[error("confidence must lie strictly between 0 and 1, got {0}")]
    Confidence(f64),

    /// Ensemble of zero paths
    #[error("ensemble size must be positive")]
    ZeroEnsemble,
}

/// Everything needed for one simulation run.
///
/// Deserializes with defaults for every missing field, so a config file only
/// has to name the instruments and weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
    /// Starting portfolio value (default: 10,000)
    pub capital: f64,

    /// Trading days to simulate (default: 252)
    pub horizon_days: usize,

    /// Instrument tickers
    pub symbols: Vec<String>,

    /// Portfolio weights, one per instrument
    pub weights: Vec<f64>,

    /// Years of price history to fetch (default: 5)
    pub history_years: u32,

    /// Back-fill short histories from proxy indices (default: true)
    pub use_interpolation: bool,

    /// Confidence level for VaR and CVaR (default: 0.95)
    pub confidence: f64,

    /// Number of simulated paths (default: 10,000)
    pub ensemble_size: usize,

    /// Calibration search settings
    pub calibration: CalibrationConfig,

    /// Proxy index tickers
    pub proxies: ProxyConfig,

    /// Seed for every random draw of the run; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            capital: 10_000.0,
            horizon_days: 252,
            symbols: Vec::new(),
            weights: Vec::new(),
            history_years: 5,
            use_interpolation: true,
            confidence: DEFAULT_CONFIDENCE,
            ensemble_size: DEFAULT_ENSEMBLE_SIZE,
            calibration: CalibrationConfig::default(),
            proxies: ProxyConfig::default(),
            seed: None,
        }
    }
}

impl SimulationRequest {
    /// Request for the given instruments and weights, defaults elsewhere.
    pub fn new(symbols: Vec<String>, weights: Vec<f64>) -> Self {
        Self {
            symbols,
            weights,
            ..Self::default()
        }
    }

    /// Request with [`equal_weights`] for the given instruments.
    pub fn equally_weighted(symbols: Vec<String>) -> Self {
        let weights = equal_weights(symbols.len());
        Self::new(symbols, weights)
    }

    /// Check the request before anything is fetched.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::EmptyPortfolio);
        }
        if self.weights.len() != self.symbols.len() {
            return Err(ConfigError::WeightCount {
                symbols: self.symbols.len(),
                weights: self.weights.len(),
            });
        }

        let sum: f64 = self.weights.iter().sum();
        // NaN sums fail this comparison.
        let sum_ok = (sum - 1.0).abs() <= WEIGHT_TOLERANCE;
        if !sum_ok {
            return Err(ConfigError::WeightSum { sum });
        }
        let capital_ok = self.capital.is_finite() && self.capital > 0.0;
        if !capital_ok {
            return Err(ConfigError::NonPositiveCapital(self.capital));
        }
        if self.horizon_days == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.history_years == 0 {
            return Err(ConfigError::HistoryYears(self.history_years));
        }
        let confidence_ok = self.confidence > 0.0 && self.confidence < 1.0;
        if !confidence_ok {
            return Err(ConfigError::Confidence(self.confidence));
        }
        if self.ensemble_size == 0 {
            return Err(ConfigError::ZeroEnsemble);
        }
        Ok(())
    }

    /// Calibration settings, seeded from the run seed when none is set.
    ///
    /// The derived seed is mixed with [`CALIBRATION_SEED_SALT`] so calibration
    /// trials never replay the simulation paths' random streams.
    pub fn calibration_config(&self) -> CalibrationConfig {
        CalibrationConfig {
            trials: self.calibration.trials,
            seed: self
                .calibration
                .seed
                .or_else(|| self.seed.map(|seed| seed ^ CALIBRATION_SEED_SALT)),
        }
    }
}

/// Default weights for `n` instruments.
///
/// The first `n - 1` weights are `1/n` cut down to two decimals; the last one
/// takes the remainder so the sum is 1. No weight is ever negative.
///
/// # Examples
///
/// ```
/// use riskfolio::equal_weights;
///
/// assert_eq!(equal_weights(3), vec![0.33, 0.33, 0.34]);
/// assert_eq!(equal_weights(6), vec![0.16, 0.16, 0.16, 0.16, 0.16, 0.2]);
/// ```
pub fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let share = (100.0 / n as f64).floor() / 100.0;
    let mut weights = vec![share; n - 1];
    let assigned: f64 = weights.iter().sum();
    weights.push(round2(1.0 - assigned));
    weights
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
