//! Daily return series downloaded as CSV from Stooq.
//!
//! Stooq serves the full daily history of a ticker as
//! `Date,Open,High,Low,Close,Volume`. Tickers carry a market suffix
//! (`AAPL.US`, `CDR.PL`) and indices a caret (`^SPX`).

use crate::error::{DataError, Result};
use crate::provider::ReturnsProvider;
use crate::series::{ReturnSeries, returns_from_prices};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://stooq.pl/q/d/l/";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";
const CLOSE_COLUMN: usize = 4;

/// Stooq CSV returns provider.
#[derive(Debug, Clone)]
pub struct StooqReturnsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl StooqReturnsProvider {
    /// Create a provider with the default 5 second timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(5))
    }

    /// Create a provider with a custom request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different download endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Download URL for `symbol`.
    pub fn url_for(&self, symbol: &str) -> String {
        let ticker = symbol.trim().to_lowercase().replace('^', "%5E");
        format!("{}?s={}&i=d", self.base_url, ticker)
    }
}

/// Extract closing prices from a Stooq CSV body, oldest first.
///
/// The header row is skipped, as are rows with fewer than five fields or an
/// unparsable close.
pub fn parse_closes(body: &str) -> Vec<f64> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes())
        .records()
        .filter_map(|record| record.ok())
        .filter(|record| record.len() > CLOSE_COLUMN)
        .filter_map(|record| record.get(CLOSE_COLUMN)?.trim().parse::<f64>().ok())
        .collect()
}

#[async_trait]
impl ReturnsProvider for StooqReturnsProvider {
    async fn fetch_returns(&self, symbol: &str, years: u32) -> Result<ReturnSeries> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = self.url_for(symbol);
        debug!(symbol, %url, "downloading daily history from Stooq");

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Http {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let closes = parse_closes(&body);
        if closes.len() < 2 {
            return Err(DataError::missing(
                symbol,
                "no price data (wrong ticker?)",
            ));
        }

        returns_from_prices(symbol, &closes, years)
    }
}
