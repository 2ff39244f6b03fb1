#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/riskfolio/riskfolio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod instruments;

// Re-export main types from sub-crates
pub use riskfolio_data as data;
pub use riskfolio_output as output;
pub use riskfolio_risk as risk;

pub use config::{ConfigError, SimulationRequest, WEIGHT_TOLERANCE, equal_weights};
pub use engine::{SimulationResult, run_simulation};
pub use error::{Error, Result};
pub use instruments::{Instrument, InstrumentTable};

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
