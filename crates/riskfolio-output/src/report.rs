//! Diagnostic report for a simulation run.
//!
//! The report has two sections. The model section lists the calibrated GARCH
//! parameters with short qualitative annotations and describes how the
//! calibration went. The data-quality section lists every alignment note; its
//! header is always present, even when nothing was flagged.

use chrono::{DateTime, Utc};
use riskfolio_data::AlignmentNote;
use riskfolio_risk::{Calibration, garch::VARIANCE_FLOOR};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use thiserror::Error;

/// α above this reads as a nervous market.
pub const NERVOUS_ALPHA: f64 = 0.09;

/// α below this reads as a very stable market.
pub const STABLE_ALPHA: f64 = 0.04;

/// β above this reads as strongly persistent volatility.
pub const PERSISTENT_BETA: f64 = 0.90;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required field was not set on the builder.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// Diagnostic report for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Instruments in the portfolio.
    pub symbols: Vec<String>,

    /// Calibration outcome.
    pub calibration: Calibration,

    /// Alignment and data-quality notes.
    pub notes: Vec<AlignmentNote>,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticReport {
    /// Create a new report.
    pub fn new(symbols: Vec<String>, calibration: Calibration, notes: Vec<AlignmentNote>) -> Self {
        Self {
            symbols,
            calibration,
            notes,
            timestamp: Utc::now(),
        }
    }

    /// Start building a report.
    pub fn builder() -> ReportBuilder {
        ReportBuilder::new()
    }

    /// Qualitative remarks on the calibrated parameters.
    pub fn annotations(&self) -> Vec<&'static str> {
        let params = &self.calibration.params;
        alpha_remark(params.alpha)
            .into_iter()
            .chain(beta_remark(params.beta))
            .collect()
    }

    /// Render the report as plain text.
    pub fn to_text(&self) -> String {
        let params = &self.calibration.params;
        let mut out = String::new();

        let _ = writeln!(out, "=== GARCH MODEL PARAMETERS ===");
        let _ = writeln!(out, "Portfolio: [{}]", self.symbols.join(", "));
        let _ = writeln!(out, "• Alpha:    {:.6}", params.alpha);
        if let Some(remark) = alpha_remark(params.alpha) {
            let _ = writeln!(out, "  -> {remark}");
        }
        let _ = writeln!(out, "• Beta:     {:.6}", params.beta);
        if let Some(remark) = beta_remark(params.beta) {
            let _ = writeln!(out, "  -> {remark}");
        }
        let _ = writeln!(out, "• Omega:    {:.6}", params.omega);
        let _ = writeln!(out, "• Persistence (α+β): {:.6}", params.persistence());

        match self.calibration.score {
            Some(score) => {
                let _ = writeln!(
                    out,
                    "• Calibration: {}/{} trials accepted, best score {:.4}",
                    self.calibration.accepted_trials, self.calibration.total_trials, score
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "• Calibration: no trial accepted, fallback parameters in use"
                );
            }
        }
        if self.calibration.is_degenerate() {
            let _ = writeln!(
                out,
                "• Historical returns carry no variance; scores used the {VARIANCE_FLOOR:e} variance floor"
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "=== DATA QUALITY ===");
        for note in &self.notes {
            let _ = writeln!(out, "ℹ {note}");
        }

        out
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn alpha_remark(alpha: f64) -> Option<&'static str> {
    if alpha > NERVOUS_ALPHA {
        Some("Warning! Market very nervous.")
    } else if alpha < STABLE_ALPHA {
        Some("Market very stable.")
    } else {
        None
    }
}

fn beta_remark(beta: f64) -> Option<&'static str> {
    (beta > PERSISTENT_BETA).then_some("Warning! Strong volatility trends persist.")
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbols: Vec<String>,
    calibration: Option<Calibration>,
    notes: Vec<AlignmentNote>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the portfolio instruments.
    pub fn symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Set the calibration outcome.
    pub const fn calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Append data-quality notes.
    pub fn notes(mut self, notes: impl IntoIterator<Item = AlignmentNote>) -> Self {
        self.notes.extend(notes);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<DiagnosticReport, ReportError> {
        let calibration = self
            .calibration
            .ok_or(ReportError::MissingField("calibration"))?;
        Ok(DiagnosticReport::new(self.symbols, calibration, self.notes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskfolio_risk::GarchParams;

    fn calibration(alpha: f64, beta: f64) -> Calibration {
        let variance = 0.0001;
        Calibration {
            params: GarchParams {
                omega: variance * (1.0 - alpha - beta),
                alpha,
                beta,
                initial_variance: variance,
            },
            score: Some(-9876.5),
            accepted_trials: 1480,
            total_trials: 2000,
            baseline_variance: variance,
        }
    }

    #[test]
    fn test_nervous_and_persistent_annotations() {
        let report = DiagnosticReport::new(vec!["PKO".into()], calibration(0.12, 0.86), vec![]);
        let text = report.to_text();

        assert!(text.contains("Market very nervous"));
        assert!(text.contains("Strong volatility trends persist"));
        assert!(!text.contains("Market very stable"));
        assert_eq!(report.annotations().len(), 2);
    }

    #[test]
    fn test_stable_annotation() {
        let report = DiagnosticReport::new(vec!["PKO".into()], calibration(0.03, 0.70), vec![]);
        assert_eq!(report.annotations(), vec!["Market very stable."]);
    }

    #[test]
    fn test_text_lists_every_annotation() {
        for (alpha, beta) in [(0.12, 0.86), (0.03, 0.70), (0.06, 0.95), (0.06, 0.85)] {
            let report = DiagnosticReport::new(vec!["PKO".into()], calibration(alpha, beta), vec![]);
            let text = report.to_text();
            let listed: Vec<&str> = text
                .lines()
                .filter_map(|line| line.strip_prefix("  -> "))
                .collect();
            assert_eq!(listed, report.annotations());
        }
    }

    #[test]
    fn test_neutral_parameters_have_no_annotation() {
        let report = DiagnosticReport::new(vec!["PKO".into()], calibration(0.06, 0.85), vec![]);
        assert!(report.annotations().is_empty());
    }

    #[test]
    fn test_data_quality_header_always_present() {
        let report = DiagnosticReport::new(vec!["A".into()], calibration(0.06, 0.85), vec![]);
        let text = report.to_text();

        assert!(text.contains("=== GARCH MODEL PARAMETERS ==="));
        assert!(text.contains("=== DATA QUALITY ==="));
        assert!(text.trim_end().ends_with("=== DATA QUALITY ==="));
    }

    #[test]
    fn test_notes_follow_model_section() {
        let notes = vec![AlignmentNote::Truncated { days: 300 }];
        let report = DiagnosticReport::new(vec!["A".into(), "B".into()], calibration(0.06, 0.85), notes);
        let text = report.to_text();

        let model = text.find("GARCH MODEL").unwrap();
        let quality = text.find("DATA QUALITY").unwrap();
        let note = text.find("analysis truncated to 300 days").unwrap();
        assert!(model < quality && quality < note);
        assert!(text.contains("Portfolio: [A, B]"));
    }

    #[test]
    fn test_fallback_and_degenerate_lines() {
        let mut calib = calibration(0.05, 0.90);
        calib.score = None;
        calib.accepted_trials = 0;
        calib.baseline_variance = 0.0;

        let text = DiagnosticReport::new(vec![], calib, vec![]).to_text();
        assert!(text.contains("fallback parameters in use"));
        assert!(text.contains("variance floor"));
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .symbols(vec!["MSFT.US".to_string()])
            .calibration(calibration(0.05, 0.9))
            .notes([AlignmentNote::ResidualTruncation { days: 10 }])
            .build()
            .unwrap();

        assert_eq!(report.symbols, vec!["MSFT.US"]);
        assert_eq!(report.notes.len(), 1);
        assert!(report.to_json().unwrap().contains("\"accepted_trials\": 1480"));
    }

    #[test]
    fn test_builder_requires_calibration() {
        let err = ReportBuilder::new().build().unwrap_err();
        assert!(matches!(err, ReportError::MissingField("calibration")));
    }
}
