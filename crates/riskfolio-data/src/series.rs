//! Daily return series.
//!
//! A [`ReturnSeries`] is the chronological sequence of simple daily returns
//! for one instrument, oldest first. Providers build them from closing
//! prices with [`returns_from_prices`].

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Number of trading days assumed per calendar year of history.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Chronological daily fractional returns for a single instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnSeries(Vec<f64>);

impl ReturnSeries {
    /// Wrap returns ordered oldest to newest.
    pub const fn new(returns: Vec<f64>) -> Self {
        Self(returns)
    }

    /// The returns as a slice, oldest first.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// The most recent `n` observations (all of them if `n` exceeds the length).
    pub fn most_recent(&self, n: usize) -> &[f64] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }

    /// The oldest `n` observations (all of them if `n` exceeds the length).
    pub fn oldest(&self, n: usize) -> &[f64] {
        &self.0[..n.min(self.0.len())]
    }

    /// Arithmetic mean of the returns, 0 for an empty series.
    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }

    /// Consume the series and return the underlying vector.
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for ReturnSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for ReturnSeries {
    fn from(returns: Vec<f64>) -> Self {
        Self(returns)
    }
}

impl FromIterator<f64> for ReturnSeries {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Convert closing prices (oldest first) into simple daily returns.
///
/// Only the most recent `years * 252` prices are used, so `n` prices yield
/// `n - 1` returns: `r[i] = (p[i] - p[i-1]) / p[i-1]`.
///
/// # Errors
/// Returns [`DataError::MissingData`] when fewer than two prices remain.
///
/// # Examples
///
/// ```
/// use riskfolio_data::returns_from_prices;
///
/// let returns = returns_from_prices("TEST", &[100.0, 110.0, 99.0], 1).unwrap();
/// assert_eq!(returns.len(), 2);
/// assert!((returns[0] - 0.10).abs() < 1e-12);
/// assert!((returns[1] + 0.10).abs() < 1e-12);
/// ```
pub fn returns_from_prices(symbol: &str, prices: &[f64], years: u32) -> Result<ReturnSeries> {
    if prices.len() < 2 {
        return Err(DataError::missing(
            symbol,
            format!("need at least 2 prices, got {}", prices.len()),
        ));
    }

    let days_needed = years as usize * TRADING_DAYS_PER_YEAR;
    let window = &prices[prices.len().saturating_sub(days_needed)..];
    if window.len() < 2 {
        return Err(DataError::missing(
            symbol,
            format!("history window of {years} year(s) leaves fewer than 2 prices"),
        ));
    }

    Ok(window.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}
