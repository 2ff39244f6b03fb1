//! Yahoo Finance data providers.

pub mod returns;

pub use returns::YahooReturnsProvider;
