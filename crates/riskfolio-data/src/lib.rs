#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/riskfolio/riskfolio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod align;
pub mod error;
pub mod provider;
pub mod proxy;
pub mod series;
pub mod stooq;
pub mod yahoo;

pub use align::{AlignedReturns, AlignmentNote, align_returns};
pub use error::{DataError, Result};
pub use provider::{InMemoryReturnsProvider, ReturnsProvider};
pub use proxy::{ProxyCache, ProxyConfig, ProxyKind};
pub use series::{ReturnSeries, TRADING_DAYS_PER_YEAR, returns_from_prices};
pub use stooq::StooqReturnsProvider;
pub use yahoo::YahooReturnsProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
