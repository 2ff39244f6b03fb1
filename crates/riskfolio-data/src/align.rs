//! Alignment of per-instrument return series.
//!
//! Instruments rarely share the same amount of history. The aligner
//! right-aligns every series on the most recent day and cuts them to a common
//! length, so row `i` of the resulting matrix is the same trading day for
//! every instrument. With interpolation enabled, instruments shorter than the
//! longest history first borrow their missing oldest days from a proxy index.

use crate::error::{DataError, Result};
use crate::provider::ReturnsProvider;
use crate::proxy::ProxyCache;
use crate::series::ReturnSeries;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Minimum number of returns an instrument must have to be aligned.
pub const MIN_OBSERVATIONS: usize = 2;

/// Data-quality remark produced while aligning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentNote {
    /// An instrument's oldest days were filled from a proxy index.
    Patched {
        /// Patched instrument
        symbol: String,
        /// Number of days taken from the proxy
        days: usize,
        /// Proxy ticker the days came from
        proxy: String,
    },
    /// Interpolation was off and the window was cut to the youngest instrument.
    Truncated {
        /// Common length after truncation
        days: usize,
    },
    /// Interpolation was on but some instruments could not be patched.
    ResidualTruncation {
        /// Common length after truncation
        days: usize,
    },
}

impl fmt::Display for AlignmentNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patched {
                symbol,
                days,
                proxy,
            } => write!(f, "{symbol}: patched {days} days with {proxy} data"),
            Self::Truncated { days } => {
                write!(f, "analysis truncated to {days} days (youngest instrument)")
            }
            Self::ResidualTruncation { days } => {
                write!(f, "despite interpolation, analysis shortened to {days} days")
            }
        }
    }
}

/// Return series aligned to a common window.
///
/// The matrix is `days x instruments`, oldest day first, with columns in the
/// order the instruments were supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    symbols: Vec<String>,
    matrix: Array2<f64>,
    max_len: usize,
    notes: Vec<AlignmentNote>,
}

impl AlignedReturns {
    /// Instrument symbols, in column order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Aligned returns, `days x instruments`.
    pub const fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Aligned returns of the instrument in column `index`.
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.matrix.index_axis(Axis(1), index)
    }

    /// Common number of days.
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    /// Whether the aligned window is empty.
    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    /// Length of the longest raw series before alignment.
    pub const fn max_len(&self) -> usize {
        self.max_len
    }

    /// Data-quality remarks, in the order they were raised.
    pub fn notes(&self) -> &[AlignmentNote] {
        &self.notes
    }
}

/// Align per-instrument return series to a common window.
///
/// With `use_interpolation` set, every eligible instrument shorter than the
/// longest series is prefixed with the oldest days of its proxy index, provided
/// the proxy holds at least as many observations as the patched series needs.
/// Proxies are fetched through `proxies`, at most once each.
///
/// # Errors
/// Returns [`DataError::InsufficientData`] when no instruments are given or
/// when any instrument has fewer than [`MIN_OBSERVATIONS`] returns.
pub async fn align_returns<P>(
    inputs: Vec<(String, ReturnSeries)>,
    use_interpolation: bool,
    proxies: &mut ProxyCache<'_, P>,
) -> Result<AlignedReturns>
where
    P: ReturnsProvider + ?Sized,
{
    if inputs.is_empty() {
        return Err(DataError::InsufficientData {
            symbol: "portfolio".to_string(),
            required: 1,
            actual: 0,
        });
    }

    for (symbol, series) in &inputs {
        if series.len() < MIN_OBSERVATIONS {
            return Err(DataError::InsufficientData {
                symbol: symbol.clone(),
                required: MIN_OBSERVATIONS,
                actual: series.len(),
            });
        }
    }

    let max_len = inputs.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
    let mut notes = Vec::new();

    let inputs = if use_interpolation {
        let mut patched = Vec::with_capacity(inputs.len());
        for (symbol, series) in inputs {
            let series = if series.len() < max_len {
                patch_series(&symbol, series, max_len, proxies, &mut notes).await
            } else {
                series
            };
            patched.push((symbol, series));
        }
        patched
    } else {
        inputs
    };

    let days = inputs.iter().map(|(_, s)| s.len()).min().unwrap_or(0);
    if days < max_len {
        notes.push(if use_interpolation {
            AlignmentNote::ResidualTruncation { days }
        } else {
            AlignmentNote::Truncated { days }
        });
    }

    let matrix = Array2::from_shape_fn((days, inputs.len()), |(i, j)| {
        inputs[j].1.most_recent(days)[i]
    });

    info!(
        instruments = inputs.len(),
        days,
        max_len,
        interpolated = use_interpolation,
        "aligned return series"
    );

    Ok(AlignedReturns {
        symbols: inputs.into_iter().map(|(symbol, _)| symbol).collect(),
        matrix,
        max_len,
        notes,
    })
}

async fn patch_series<P>(
    symbol: &str,
    series: ReturnSeries,
    target_len: usize,
    proxies: &mut ProxyCache<'_, P>,
    notes: &mut Vec<AlignmentNote>,
) -> ReturnSeries
where
    P: ReturnsProvider + ?Sized,
{
    let missing = target_len - series.len();

    let Some(kind) = proxies.kind_for(symbol) else {
        debug!(symbol, missing, "no proxy eligible, leaving series short");
        return series;
    };

    let proxy_symbol = proxies.symbol(kind);
    let Some(proxy) = proxies.get(kind).await else {
        return series;
    };

    if proxy.len() < target_len {
        debug!(
            symbol,
            proxy = proxy_symbol,
            proxy_len = proxy.len(),
            target_len,
            "proxy history too short, leaving series short"
        );
        return series;
    }

    let mut filled = Vec::with_capacity(target_len);
    filled.extend_from_slice(proxy.oldest(missing));
    filled.extend_from_slice(&series);

    notes.push(AlignmentNote::Patched {
        symbol: symbol.to_string(),
        days: missing,
        proxy: proxy_symbol.to_string(),
    });

    ReturnSeries::new(filled)
}
