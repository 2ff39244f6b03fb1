//! Export functionality for simulation results.
//!
//! CSV and JSON export of the risk summary, the terminal value distribution
//! and downsampled representative paths for charting.

use crate::summary::{RepresentativePaths, RiskSummary};
use riskfolio_risk::SimulationEnsemble;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of points kept per charted path.
pub const CHART_POINTS: usize = 200;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for types that can be exported.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn csv_string<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

impl Exporter for RiskSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string([self]),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Terminal value of every simulated path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerminalValuesExport {
    /// Terminal values in path order.
    pub values: Vec<f64>,
}

impl TerminalValuesExport {
    /// Collect the terminal values of an ensemble.
    pub fn from_ensemble(ensemble: &SimulationEnsemble) -> Self {
        Self {
            values: ensemble.terminal_values().to_vec(),
        }
    }
}

#[derive(Serialize)]
struct TerminalRecord {
    path: usize,
    terminal_value: f64,
}

impl Exporter for TerminalValuesExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(self.values.iter().enumerate().map(
                |(path, &terminal_value)| TerminalRecord {
                    path,
                    terminal_value,
                },
            )),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// One charted point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathPoint {
    /// Series label (`best`, `mean`, `var`, `cvar` or `capital`).
    pub series: String,

    /// Simulated day, 0 being the start.
    pub day: usize,

    /// Portfolio value.
    pub value: f64,
}

/// Downsampled representative paths plus a flat initial-capital line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathSeriesExport {
    /// All charted points, grouped by series.
    pub points: Vec<PathPoint>,
}

impl PathSeriesExport {
    /// Build chart series for the representative paths of an ensemble.
    ///
    /// Every series keeps every `max(1, len / 200)`-th day and always the
    /// final day.
    pub fn new(ensemble: &SimulationEnsemble, picks: &RepresentativePaths, capital: f64) -> Self {
        let mut points = Vec::new();

        for (label, index) in picks.labelled() {
            if let Some(path) = ensemble.path(index) {
                points.extend(
                    sampled_days(path.len())
                        .into_iter()
                        .map(|day| PathPoint {
                            series: label.to_string(),
                            day,
                            value: path[day],
                        }),
                );
            }
        }

        let length = ensemble.horizon() + 1;
        points.extend(sampled_days(length).into_iter().map(|day| PathPoint {
            series: "capital".to_string(),
            day,
            value: capital,
        }));

        Self { points }
    }

    /// Points of one series.
    pub fn series<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a PathPoint> + 'a {
        self.points.iter().filter(move |p| p.series == label)
    }
}

impl Exporter for PathSeriesExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(&self.points),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Days kept when charting a path of `len` values.
fn sampled_days(len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let step = (len / CHART_POINTS).max(1);
    let mut days: Vec<usize> = (0..len).step_by(step).collect();
    if days.last() != Some(&(len - 1)) {
        days.push(len - 1);
    }
    days
}
