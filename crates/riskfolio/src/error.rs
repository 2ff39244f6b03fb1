//! Top-level error type.

use crate::config::ConfigError;
use riskfolio_data::DataError;
use riskfolio_risk::PortfolioError;
use thiserror::Error;

/// Result type for simulation runs.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum Error {
    /// Market data could not be fetched or aligned
    #[error(transparent)]
    Data(#[from] DataError),

    /// The request failed validation
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Portfolio aggregation failed
    #[error(transparent)]
    Risk(#[from] PortfolioError),

    /// A background computation panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
