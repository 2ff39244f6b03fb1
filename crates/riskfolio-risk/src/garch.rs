//! GARCH(1,1) Volatility Calibration
//!
//! Fits the recursive variance model
//!
//! σ²(t+1) = ω + α * r(t)² + β * σ²(t)
//!
//! to a daily return series by random search. Every trial draws α and β
//! independently from fixed ranges, rejects non-stationary pairs
//! (α + β ≥ 0.999) and pins ω so the model's long-run variance equals the
//! sample variance: ω = σ²_sample * (1 - α - β).
//!
//! Candidates are scored with a Gaussian quasi negative log-likelihood
//! (constant terms dropped):
//!
//! L = Σ_t [ ln σ²(t) + r(t)² / σ²(t) ]
//!
//! Lower is better. Trials run in parallel; the best candidate is kept in a
//! mutex-guarded slot local to one calibration call. When two trials tie
//! exactly, whichever reaches the slot first wins, so ties are resolved
//! non-deterministically.

use crate::seed;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Default number of random-search trials.
pub const DEFAULT_TRIALS: usize = 2000;

/// Trials with α + β at or above this bound are rejected.
pub const STATIONARITY_BOUND: f64 = 0.999;

/// Variance floor applied while scoring, keeps ln and division defined.
pub const VARIANCE_FLOOR: f64 = 1e-6;

const ALPHA_LOW: f64 = 0.01;
const ALPHA_HIGH: f64 = 0.26;
const BETA_LOW: f64 = 0.50;
const BETA_HIGH: f64 = 0.99;

/// Parameters of a GARCH(1,1) variance recursion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarchParams {
    /// Constant term ω
    pub omega: f64,
    /// Weight α of the previous squared shock
    pub alpha: f64,
    /// Weight β of the previous variance
    pub beta: f64,
    /// Variance the recursion starts from
    pub initial_variance: f64,
}

impl GarchParams {
    /// Conservative preset used when no trial is accepted.
    pub const fn fallback(baseline_variance: f64) -> Self {
        Self {
            omega: baseline_variance * 0.05,
            alpha: 0.05,
            beta: 0.90,
            initial_variance: baseline_variance,
        }
    }

    /// Persistence α + β.
    pub const fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Whether the recursion satisfies the stationarity guard.
    pub const fn is_stationary(&self) -> bool {
        self.persistence() < STATIONARITY_BOUND
    }

    /// Long-run variance ω / (1 - α - β), if the model is stationary.
    pub fn long_run_variance(&self) -> Option<f64> {
        self.is_stationary()
            .then(|| self.omega / (1.0 - self.persistence()))
    }

    /// Variance for the next period given this period's shock and variance.
    pub const fn next_variance(&self, shock: f64, variance: f64) -> f64 {
        self.omega + self.alpha * shock * shock + self.beta * variance
    }
}

impl fmt::Display for GarchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "α={:.6}, β={:.6}, ω={:.6}",
            self.alpha, self.beta, self.omega
        )
    }
}

/// Random-search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Number of candidate draws (default: 2000)
    pub trials: usize,

    /// Seed for the per-trial generators; drawn from entropy when `None`
    pub seed: Option<u64>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
        }
    }
}

/// Outcome of a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Best parameters found (the fallback preset if nothing was accepted)
    pub params: GarchParams,

    /// Score of `params`, `None` when the fallback preset was returned
    pub score: Option<f64>,

    /// Trials that passed the stationarity guard
    pub accepted_trials: usize,

    /// Total trials drawn
    pub total_trials: usize,

    /// Population variance of the calibration sample
    pub baseline_variance: f64,
}

impl Calibration {
    /// Whether the fallback preset was returned.
    pub const fn used_fallback(&self) -> bool {
        self.score.is_none()
    }

    /// Whether the sample carried no variance (constant or too short).
    pub const fn is_degenerate(&self) -> bool {
        self.baseline_variance <= 0.0
    }
}

/// Random-search GARCH(1,1) calibrator.
#[derive(Debug, Default)]
pub struct GarchCalibrator {
    config: CalibrationConfig,
}

struct BestCandidate {
    score: Option<f64>,
    params: GarchParams,
}

impl GarchCalibrator {
    /// Create a calibrator with the given configuration.
    pub const fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrate against `returns` (oldest first).
    ///
    /// Never fails: a degenerate sample scores against the variance floor
    /// and an empty search returns [`GarchParams::fallback`].
    pub fn calibrate(&self, returns: &[f64]) -> Calibration {
        let baseline_variance = population_variance(returns);
        let base_seed = seed::base_seed(self.config.seed);

        debug!(
            observations = returns.len(),
            baseline_variance,
            trials = self.config.trials,
            "starting GARCH random search"
        );

        let best = Mutex::new(BestCandidate {
            score: None,
            params: GarchParams::fallback(baseline_variance),
        });
        let accepted = AtomicUsize::new(0);

        (0..self.config.trials).into_par_iter().for_each(|trial| {
            let mut rng = seed::trial_rng(base_seed, trial);
            let Some((alpha, beta)) = draw_candidate(&mut rng) else {
                return;
            };
            accepted.fetch_add(1, Ordering::Relaxed);

            let params = GarchParams {
                omega: baseline_variance * (1.0 - alpha - beta),
                alpha,
                beta,
                initial_variance: baseline_variance,
            };
            let score = negative_log_likelihood(returns, &params);

            let mut best = best.lock().unwrap_or_else(PoisonError::into_inner);
            let improves = match best.score {
                Some(current) => score < current,
                None => !score.is_nan(),
            };
            if improves {
                *best = BestCandidate {
                    score: Some(score),
                    params,
                };
            }
        });

        let best = best.into_inner().unwrap_or_else(PoisonError::into_inner);
        let calibration = Calibration {
            params: best.params,
            score: best.score,
            accepted_trials: accepted.into_inner(),
            total_trials: self.config.trials,
            baseline_variance,
        };

        if calibration.used_fallback() {
            warn!(
                accepted = calibration.accepted_trials,
                "no GARCH trial accepted, using fallback parameters"
            );
        }
        if calibration.is_degenerate() {
            warn!("return sample has zero variance, scores use the variance floor");
        }
        info!(
            params = %calibration.params,
            accepted = calibration.accepted_trials,
            "GARCH calibration finished"
        );

        calibration
    }
}

/// Draw one (α, β) pair, `None` if it violates the stationarity guard.
fn draw_candidate<R: Rng>(rng: &mut R) -> Option<(f64, f64)> {
    let alpha = rng.gen_range(ALPHA_LOW..ALPHA_HIGH);
    let beta = rng.gen_range(BETA_LOW..BETA_HIGH);
    (alpha + beta < STATIONARITY_BOUND).then_some((alpha, beta))
}

/// Population variance (divides by N), 0 for an empty sample.
pub fn population_variance(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n
}

/// Quasi negative log-likelihood of `returns` under `params`.
///
/// Walks the series oldest first, starting from `params.initial_variance`
/// and flooring non-positive variances at [`VARIANCE_FLOOR`].
pub fn negative_log_likelihood(returns: &[f64], params: &GarchParams) -> f64 {
    let mut variance = params.initial_variance;
    let mut total = 0.0;

    for &r in returns {
        if variance <= 0.0 {
            variance = VARIANCE_FLOOR;
        }
        total += variance.ln() + r * r / variance;
        variance = params.next_variance(r, variance);
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::StandardNormal;

    /// Simulate a GARCH(1,1) return series.
    fn garch_sample(params: &GarchParams, len: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut variance = params.initial_variance;
        (0..len)
            .map(|_| {
                let z: f64 = rng.sample(StandardNormal);
                let r = variance.sqrt() * z;
                variance = params.next_variance(r, variance);
                r
            })
            .collect()
    }

    fn sample() -> Vec<f64> {
        let truth = GarchParams {
            omega: 0.0001 * 0.1,
            alpha: 0.12,
            beta: 0.78,
            initial_variance: 0.0001,
        };
        garch_sample(&truth, 1500, 7)
    }

    #[test]
    fn test_candidates_respect_stationarity() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut rejected = 0;
        for _ in 0..10_000 {
            match draw_candidate(&mut rng) {
                Some((alpha, beta)) => {
                    assert!(alpha + beta < STATIONARITY_BOUND);
                    assert!((ALPHA_LOW..ALPHA_HIGH).contains(&alpha));
                    assert!((BETA_LOW..BETA_HIGH).contains(&beta));
                }
                None => rejected += 1,
            }
        }
        // Roughly a quarter of the search box is non-stationary.
        assert!(rejected > 1000 && rejected < 4000);
    }

    #[test]
    fn test_omega_pins_long_run_variance() {
        let returns = sample();
        let calibrator = GarchCalibrator::new(CalibrationConfig {
            trials: 500,
            seed: Some(1),
        });
        let calibration = calibrator.calibrate(&returns);
        let params = calibration.params;

        assert!(!calibration.used_fallback());
        assert!(params.is_stationary());
        assert!(params.omega >= 0.0);
        assert_relative_eq!(
            params.omega,
            calibration.baseline_variance * (1.0 - params.alpha - params.beta),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            params.long_run_variance().unwrap(),
            calibration.baseline_variance,
            max_relative = 1e-9
        );
        assert_eq!(params.initial_variance, calibration.baseline_variance);
    }

    #[test]
    fn test_best_score_is_minimum_of_accepted() {
        let returns = sample();
        let calibration = GarchCalibrator::new(CalibrationConfig {
            trials: 300,
            seed: Some(3),
        })
        .calibrate(&returns);

        let best = calibration.score.unwrap();
        assert_relative_eq!(
            best,
            negative_log_likelihood(&returns, &calibration.params),
            max_relative = 1e-12
        );

        // No accepted draw with the same seed scores lower.
        let mut lowest = f64::INFINITY;
        for trial in 0..300 {
            let mut rng = seed::trial_rng(3, trial);
            if let Some((alpha, beta)) = draw_candidate(&mut rng) {
                let params = GarchParams {
                    omega: calibration.baseline_variance * (1.0 - alpha - beta),
                    alpha,
                    beta,
                    initial_variance: calibration.baseline_variance,
                };
                lowest = lowest.min(negative_log_likelihood(&returns, &params));
            }
        }
        assert_eq!(best, lowest);
    }

    #[test]
    fn test_seeded_calibration_is_reproducible() {
        let returns = sample();
        let config = CalibrationConfig {
            trials: 200,
            seed: Some(99),
        };
        let first = GarchCalibrator::new(config.clone()).calibrate(&returns);
        let second = GarchCalibrator::new(config).calibrate(&returns);

        assert_eq!(first.params, second.params);
        assert_eq!(first.accepted_trials, second.accepted_trials);
    }

    #[test]
    fn test_constant_returns_use_variance_floor() {
        let returns = vec![0.015_625; 250];
        let calibration = GarchCalibrator::new(CalibrationConfig {
            trials: 100,
            seed: Some(5),
        })
        .calibrate(&returns);

        assert!(calibration.is_degenerate());
        assert_eq!(calibration.baseline_variance, 0.0);
        assert_eq!(calibration.params.omega, 0.0);
        assert!(calibration.score.unwrap().is_finite());
    }

    #[test]
    fn test_zero_trials_returns_fallback() {
        let returns = sample();
        let calibration = GarchCalibrator::new(CalibrationConfig {
            trials: 0,
            seed: Some(1),
        })
        .calibrate(&returns);

        assert!(calibration.used_fallback());
        assert_eq!(calibration.accepted_trials, 0);
        assert_eq!(
            calibration.params,
            GarchParams::fallback(calibration.baseline_variance)
        );
    }

    #[test]
    fn test_empty_returns_do_not_panic() {
        let calibration = GarchCalibrator::default().calibrate(&[]);
        assert_eq!(calibration.baseline_variance, 0.0);
        assert!(calibration.params.is_stationary());
    }

    #[test]
    fn test_score_floors_non_positive_variance() {
        let params = GarchParams {
            omega: 0.0,
            alpha: 0.1,
            beta: 0.8,
            initial_variance: 0.0,
        };
        // First step scores against the floor: ln(1e-6) + 0 / 1e-6.
        assert_relative_eq!(
            negative_log_likelihood(&[0.0], &params),
            VARIANCE_FLOOR.ln()
        );
    }

    #[test]
    fn test_population_variance() {
        assert_relative_eq!(population_variance(&[1.0, 2.0, 3.0, 4.0]), 1.25);
        assert_eq!(population_variance(&[]), 0.0);
        assert_eq!(population_variance(&[0.5; 10]), 0.0);
    }

    #[test]
    fn test_display() {
        let params = GarchParams::fallback(0.0004);
        assert_eq!(params.to_string(), "α=0.050000, β=0.900000, ω=0.000020");
    }
}
