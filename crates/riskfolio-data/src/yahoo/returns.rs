//! Daily return series fetched from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::provider::ReturnsProvider;
use crate::series::{ReturnSeries, returns_from_prices};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance returns provider with rate limiting.
pub struct YahooReturnsProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooReturnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooReturnsProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooReturnsProvider {
    /// Create a provider with default rate limiting (1 req/sec).
    ///
    /// # Errors
    /// Returns an error if the Yahoo connector cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(1000))
    }

    /// Create a provider with custom rate limiting.
    ///
    /// # Errors
    /// Returns an error if the Yahoo connector cannot be built.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Smallest Yahoo range string that covers `years` of history.
    pub(crate) const fn range_for_years(years: u32) -> &'static str {
        match years {
            0 | 1 => "1y",
            2 => "2y",
            3..=5 => "5y",
            6..=10 => "10y",
            _ => "max",
        }
    }
}

#[async_trait]
impl ReturnsProvider for YahooReturnsProvider {
    async fn fetch_returns(&self, symbol: &str, years: u32) -> Result<ReturnSeries> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let range = Self::range_for_years(years);
        debug!(symbol, range, "fetching daily quotes from Yahoo Finance");

        let response = self.provider.get_quote_range(symbol, "1d", range).await?;
        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::missing(
                symbol,
                "No data returned from Yahoo Finance",
            ));
        }

        let closes: Vec<f64> = quotes.iter().map(|q| q.adjclose).collect();

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        returns_from_prices(symbol, &closes, years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_for_years() {
        assert_eq!(YahooReturnsProvider::range_for_years(1), "1y");
        assert_eq!(YahooReturnsProvider::range_for_years(2), "2y");
        assert_eq!(YahooReturnsProvider::range_for_years(4), "5y");
        assert_eq!(YahooReturnsProvider::range_for_years(10), "10y");
        assert_eq!(YahooReturnsProvider::range_for_years(25), "max");
    }

    #[tokio::test]
    async fn test_invalid_symbol() {
        let provider = YahooReturnsProvider::with_rate_limit(Duration::ZERO).unwrap();
        let result = provider.fetch_returns("  ", 1).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_fetch_returns() {
        let provider = YahooReturnsProvider::new().unwrap();
        let returns = provider.fetch_returns("AAPL", 1).await.unwrap();
        assert!(returns.len() > 200);
    }
}
