//! Risk summary of a simulated ensemble.
//!
//! Condenses the terminal values of a Monte Carlo run into the figures shown
//! to the user: mean, extremes, VaR and CVaR, all in portfolio value. Also
//! picks a handful of representative paths for charting.

use riskfolio_risk::{SimulationEnsemble, conditional_value_at_risk, value_at_risk};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary statistics of simulated terminal values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskSummary {
    /// Starting portfolio value.
    pub capital: f64,

    /// Simulated days.
    pub horizon_days: usize,

    /// Number of simulated paths.
    pub paths: usize,

    /// Mean terminal value.
    pub mean: f64,

    /// Lowest terminal value.
    pub min: f64,

    /// Highest terminal value.
    pub max: f64,

    /// Confidence level of the tail metrics.
    pub confidence: f64,

    /// Value-at-Risk, as a portfolio value.
    pub var: f64,

    /// Conditional Value-at-Risk, as a portfolio value.
    pub cvar: f64,
}

impl RiskSummary {
    /// Summarize an ensemble at the given confidence level.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskfolio_output::RiskSummary;
    /// use riskfolio_risk::SimulationEnsemble;
    ///
    /// let paths = (1..=100).map(|v| vec![50.0, f64::from(v)]).collect();
    /// let ensemble = SimulationEnsemble::from_paths(paths);
    /// let summary = RiskSummary::from_ensemble(50.0, &ensemble, 0.95);
    ///
    /// assert_eq!(summary.var, 6.0);
    /// assert_eq!(summary.max, 100.0);
    /// ```
    pub fn from_ensemble(capital: f64, ensemble: &SimulationEnsemble, confidence: f64) -> Self {
        let terminal = ensemble.terminal_values();
        let (min, max) = if terminal.is_empty() {
            (0.0, 0.0)
        } else {
            terminal
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };

        Self {
            capital,
            horizon_days: ensemble.horizon(),
            paths: ensemble.len(),
            mean: ensemble.mean_terminal_value(),
            min,
            max,
            confidence,
            var: value_at_risk(terminal, confidence),
            cvar: conditional_value_at_risk(terminal, confidence),
        }
    }

    /// Potential loss at the VaR level, relative to the starting capital.
    pub fn var_loss(&self) -> f64 {
        self.capital - self.var
    }

    /// Potential loss at the CVaR level, relative to the starting capital.
    pub fn cvar_loss(&self) -> f64 {
        self.capital - self.cvar
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let level = self.confidence * 100.0;
        let mut output = String::new();

        output.push_str(&format!(
            "\nRisk Summary: {} paths over {} days\n",
            self.paths, self.horizon_days
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("  Initial capital:      {:>14.2}\n", self.capital));
        output.push_str(&format!("  Mean terminal value:  {:>14.2}\n", self.mean));
        output.push_str(&format!("  Worst case:           {:>14.2}\n", self.min));
        output.push_str(&format!("  Best case:            {:>14.2}\n", self.max));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "  VaR ({level:.1}%):          {:>14.2}  (loss {:.2})\n",
            self.var,
            self.var_loss()
        ));
        output.push_str(&format!(
            "  CVaR ({level:.1}%):         {:>14.2}  (loss {:.2})\n",
            self.cvar,
            self.cvar_loss()
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let level = self.confidence * 100.0;
        let mut output = String::new();

        output.push_str("# Risk Summary\n\n");
        output.push_str(&format!(
            "**Simulation:** {} paths over {} days\n\n",
            self.paths, self.horizon_days
        ));
        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!("| Initial capital | {:.2} |\n", self.capital));
        output.push_str(&format!("| Mean terminal value | {:.2} |\n", self.mean));
        output.push_str(&format!("| Worst case | {:.2} |\n", self.min));
        output.push_str(&format!("| Best case | {:.2} |\n", self.max));
        output.push_str(&format!("| VaR ({level:.1}%) | {:.2} |\n", self.var));
        output.push_str(&format!("| CVaR ({level:.1}%) | {:.2} |\n", self.cvar));

        output
    }
}

impl fmt::Display for RiskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = self.confidence * 100.0;
        writeln!(
            f,
            "Risk Summary ({} paths, {} days)",
            self.paths, self.horizon_days
        )?;
        writeln!(f, "  Mean: {:.2}", self.mean)?;
        writeln!(f, "  Min: {:.2}", self.min)?;
        writeln!(f, "  Max: {:.2}", self.max)?;
        writeln!(f, "  VaR ({level:.1}%): {:.2}", self.var)?;
        writeln!(f, "  CVaR ({level:.1}%): {:.2}", self.cvar)?;
        Ok(())
    }
}

/// Indices of paths worth charting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepresentativePaths {
    /// Path with the highest terminal value.
    pub best: usize,

    /// Path ending closest to the mean.
    pub mean: usize,

    /// Path ending closest to the VaR.
    pub var: usize,

    /// Path ending closest to the CVaR.
    pub cvar: usize,
}

impl RepresentativePaths {
    /// Pick representative paths for a summarized ensemble.
    ///
    /// Returns `None` for an empty ensemble.
    pub fn select(ensemble: &SimulationEnsemble, summary: &RiskSummary) -> Option<Self> {
        let terminal = ensemble.terminal_values();
        Some(Self {
            best: max_index(terminal)?,
            mean: closest_index(terminal, summary.mean)?,
            var: closest_index(terminal, summary.var)?,
            cvar: closest_index(terminal, summary.cvar)?,
        })
    }

    /// Labelled indices, in chart order.
    pub fn labelled(&self) -> [(&'static str, usize); 4] {
        [
            ("best", self.best),
            ("mean", self.mean),
            ("var", self.var),
            ("cvar", self.cvar),
        ]
    }
}

/// Index of the value nearest to `target`. First match wins on ties.
pub fn closest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
}

/// Index of the largest value.
pub fn max_index(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}
