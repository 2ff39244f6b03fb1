//! Historical returns providers.

use crate::error::{DataError, Result};
use crate::series::{ReturnSeries, returns_from_prices};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Source of historical daily returns.
///
/// Implementations fetch closing prices for `symbol`, keep the most recent
/// `years` of trading days and convert them with [`returns_from_prices`].
#[async_trait]
pub trait ReturnsProvider: Send + Sync {
    /// Fetch the daily return series for `symbol`.
    ///
    /// # Errors
    /// Fails when the symbol is unknown, the source is unreachable, or fewer
    /// than two prices are available.
    async fn fetch_returns(&self, symbol: &str, years: u32) -> Result<ReturnSeries>;
}

/// Provider backed by price histories held in memory.
///
/// Used for offline runs and tests. Every call is counted per symbol.
#[derive(Debug, Default)]
pub struct InMemoryReturnsProvider {
    prices: HashMap<String, Vec<f64>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl InMemoryReturnsProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closing price history (oldest first) for `symbol`.
    pub fn with_prices(mut self, symbol: impl Into<String>, prices: Vec<f64>) -> Self {
        self.prices.insert(symbol.into(), prices);
        self
    }

    /// Register a symbol whose prices compound the given returns from 100.
    pub fn with_returns(self, symbol: impl Into<String>, returns: &[f64]) -> Self {
        let mut prices = Vec::with_capacity(returns.len() + 1);
        let mut price = 100.0;
        prices.push(price);
        for r in returns {
            price *= 1.0 + r;
            prices.push(price);
        }
        self.with_prices(symbol, prices)
    }

    /// Number of times `symbol` has been fetched.
    pub fn fetch_count(&self, symbol: &str) -> usize {
        self.fetches
            .lock()
            .map(|counts| counts.get(symbol).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl ReturnsProvider for InMemoryReturnsProvider {
    async fn fetch_returns(&self, symbol: &str, years: u32) -> Result<ReturnSeries> {
        if let Ok(mut counts) = self.fetches.lock() {
            *counts.entry(symbol.to_string()).or_insert(0) += 1;
        }

        let prices = self
            .prices
            .get(symbol)
            .ok_or_else(|| DataError::missing(symbol, "unknown symbol"))?;

        returns_from_prices(symbol, prices, years)
    }
}
