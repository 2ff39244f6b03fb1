//! Portfolio aggregation
//!
//! Blends aligned per-instrument daily returns into one portfolio return
//! series. Returns are treated as additive per period, so the portfolio
//! return on day i is simply:
//!
//! r_p(i) = Σ_j w_j * r_j(i)
//!
//! No compounding or rebalancing drift is modelled.

use ndarray::{Array2, ArrayView1};
use thiserror::Error;

/// Portfolio aggregation errors
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Weight vector does not match the number of instruments
    #[error("Dimension mismatch: {instruments} instruments but {weights} weights")]
    DimensionMismatch {
        /// Number of instrument columns
        instruments: usize,
        /// Number of weights supplied
        weights: usize,
    },
}

/// Weighted daily portfolio returns.
///
/// # Arguments
/// * `returns` - Aligned returns, one row per day and one column per instrument
/// * `weights` - One weight per instrument, in column order
///
/// # Errors
/// Returns [`PortfolioError::DimensionMismatch`] if the weight count differs
/// from the number of columns.
pub fn portfolio_returns(
    returns: &Array2<f64>,
    weights: &[f64],
) -> Result<Vec<f64>, PortfolioError> {
    if returns.ncols() != weights.len() {
        return Err(PortfolioError::DimensionMismatch {
            instruments: returns.ncols(),
            weights: weights.len(),
        });
    }

    Ok(returns.dot(&ArrayView1::from(weights)).to_vec())
}

/// Arithmetic mean daily return, 0 for an empty series.
pub fn mean_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().sum::<f64>() / returns.len() as f64
}
