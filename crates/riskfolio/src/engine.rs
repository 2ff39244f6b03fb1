//! Simulation pipeline.
//!
//! A run fetches every instrument's returns, aligns them (back-filling from
//! proxy indices when asked to), collapses them into portfolio returns and
//! hands the numeric work to a blocking thread: GARCH calibration followed by
//! the Monte Carlo ensemble. Both numeric phases are parallelised with rayon.

use crate::config::SimulationRequest;
use crate::error::Result;
use riskfolio_data::{AlignmentNote, ProxyCache, ReturnsProvider, align_returns};
use riskfolio_output::{DiagnosticReport, RepresentativePaths, RiskSummary};
use riskfolio_risk::{
    Calibration, GarchCalibrator, MonteCarloConfig, MonteCarloSimulator, SimulationEnsemble,
    mean_return, portfolio_returns,
};
use tracing::{debug, info};

/// Outcome of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Simulated value paths and their terminal values.
    pub ensemble: SimulationEnsemble,

    /// Calibrated volatility model.
    pub calibration: Calibration,

    /// Mean historical daily portfolio return used as drift.
    pub drift: f64,

    /// Length of the aligned history in days.
    pub history_days: usize,

    /// Terminal value statistics, VaR and CVaR.
    pub summary: RiskSummary,

    /// Model and data-quality diagnostics.
    pub report: DiagnosticReport,
}

impl SimulationResult {
    /// Alignment notes raised while preparing the data.
    pub fn notes(&self) -> &[AlignmentNote] {
        &self.report.notes
    }

    /// Diagnostic report as text.
    pub fn report_text(&self) -> String {
        self.report.to_text()
    }

    /// Paths worth charting.
    pub fn representative_paths(&self) -> Option<RepresentativePaths> {
        RepresentativePaths::select(&self.ensemble, &self.summary)
    }
}

/// Run a complete simulation.
///
/// Data is fetched sequentially on the calling task; any fetch failure aborts
/// the run. Proxy indices are fetched at most once per run, and a failed proxy
/// fetch only leaves the affected instruments unpatched.
///
/// # Errors
/// Returns [`Error::Config`](crate::Error::Config) for an invalid request
/// before anything is fetched, [`Error::Data`](crate::Error::Data) when an
/// instrument cannot be fetched or aligned, and
/// [`Error::Task`](crate::Error::Task) if the numeric phase panics.
pub async fn run_simulation<P>(
    provider: &P,
    request: &SimulationRequest,
) -> Result<SimulationResult>
where
    P: ReturnsProvider + ?Sized,
{
    request.validate()?;
    info!(
        instruments = request.symbols.len(),
        years = request.history_years,
        interpolate = request.use_interpolation,
        "starting simulation run"
    );

    let mut inputs = Vec::with_capacity(request.symbols.len());
    for symbol in &request.symbols {
        let series = provider
            .fetch_returns(symbol, request.history_years)
            .await?;
        debug!(symbol = %symbol, observations = series.len(), "fetched returns");
        inputs.push((symbol.clone(), series));
    }

    let aligned = {
        let mut proxies = ProxyCache::new(provider, &request.proxies, request.history_years);
        align_returns(inputs, request.use_interpolation, &mut proxies).await?
    };

    let portfolio = portfolio_returns(aligned.matrix(), &request.weights)?;
    let drift = mean_return(&portfolio);
    let history_days = portfolio.len();
    info!(days = history_days, drift, "portfolio returns ready");

    let calibrator = GarchCalibrator::new(request.calibration_config());
    let simulator = MonteCarloSimulator::new(MonteCarloConfig {
        ensemble_size: request.ensemble_size,
        seed: request.seed,
    });
    let capital = request.capital;
    let horizon = request.horizon_days;

    let (calibration, ensemble) = tokio::task::spawn_blocking(move || {
        let calibration = calibrator.calibrate(&portfolio);
        let ensemble = simulator.simulate(capital, horizon, drift, &calibration.params);
        (calibration, ensemble)
    })
    .await?;

    let summary = RiskSummary::from_ensemble(capital, &ensemble, request.confidence);
    let report = DiagnosticReport::new(
        request.symbols.clone(),
        calibration,
        aligned.notes().to_vec(),
    );
    info!(
        var = summary.var,
        cvar = summary.cvar,
        confidence = summary.confidence,
        "simulation run finished"
    );

    Ok(SimulationResult {
        ensemble,
        calibration,
        drift,
        history_days,
        summary,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, Error};
    use riskfolio_data::InMemoryReturnsProvider;

    fn returns(len: usize, phase: f64) -> Vec<f64> {
        (0..len)
            .map(|i| 0.01 * (i as f64 * 0.37 + phase).sin() + 0.0003)
            .collect()
    }

    fn request(symbols: &[&str], weights: Vec<f64>) -> SimulationRequest {
        let mut request =
            SimulationRequest::new(symbols.iter().map(|s| s.to_string()).collect(), weights);
        request.ensemble_size = 200;
        request.horizon_days = 20;
        request.calibration.trials = 200;
        request.seed = Some(42);
        request
    }

    #[tokio::test]
    async fn test_invalid_request_fetches_nothing() {
        let provider = InMemoryReturnsProvider::new().with_returns("A.PL", &returns(100, 0.0));
        let bad = request(&["A.PL"], vec![0.5]);

        let err = run_simulation(&provider, &bad).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::WeightSum { .. })
        ));
        assert_eq!(provider.fetch_count("A.PL"), 0);
    }

    #[tokio::test]
    async fn test_unknown_symbol_aborts() {
        let provider = InMemoryReturnsProvider::new().with_returns("A.PL", &returns(100, 0.0));
        let req = request(&["A.PL", "NOPE.PL"], vec![0.5, 0.5]);

        let err = run_simulation(&provider, &req).await.unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[tokio::test]
    async fn test_seeded_runs_match() {
        let provider = InMemoryReturnsProvider::new()
            .with_returns("A.US", &returns(300, 0.0))
            .with_returns("B.US", &returns(300, 1.3));
        let req = request(&["A.US", "B.US"], vec![0.7, 0.3]);

        let first = run_simulation(&provider, &req).await.unwrap();
        let second = run_simulation(&provider, &req).await.unwrap();

        assert_eq!(first.ensemble, second.ensemble);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.history_days, 300);
        assert!(first.notes().is_empty());
        assert!(first.representative_paths().is_some());
    }
}
