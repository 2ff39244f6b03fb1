//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while fetching or preparing return series.
///
/// Every variant is fatal to a simulation run; nothing here is retried.
#[derive(Debug, Error)]
pub enum DataError {
    /// Yahoo Finance API error
    #[error("Yahoo Finance API error: {0}")]
    YahooApi(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error returned by a remote source
    #[error("HTTP {status} while fetching {symbol} (unknown ticker?)")]
    Http {
        /// Symbol that was requested
        symbol: String,
        /// Status code returned by the server
        status: u16,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Not enough observations to align or analyse a series
    #[error("Insufficient data for {symbol}: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Symbol whose series is too short
        symbol: String,
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<yahoo_finance_api::YahooError> for DataError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        Self::YahooApi(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl DataError {
    /// Shorthand for [`DataError::MissingData`].
    pub fn missing(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingData {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}
