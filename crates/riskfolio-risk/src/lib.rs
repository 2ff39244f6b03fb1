#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/riskfolio/riskfolio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod garch;
pub mod metrics;
pub mod portfolio;
pub mod simulation;

mod seed;

// Re-export main types
pub use garch::{Calibration, CalibrationConfig, GarchCalibrator, GarchParams};
pub use metrics::{conditional_value_at_risk, value_at_risk};
pub use portfolio::{PortfolioError, mean_return, portfolio_returns};
pub use simulation::{MonteCarloConfig, MonteCarloSimulator, SimulationEnsemble};
