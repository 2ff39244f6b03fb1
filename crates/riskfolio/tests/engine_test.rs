//! End-to-end runs against an in-memory provider.

use riskfolio::data::{AlignmentNote, InMemoryReturnsProvider};
use riskfolio::{SimulationRequest, run_simulation};

fn wave(len: usize, amplitude: f64, speed: f64) -> Vec<f64> {
    (0..len)
        .map(|i| amplitude * (i as f64 * speed).sin() + 0.0002)
        .collect()
}

fn provider() -> InMemoryReturnsProvider {
    InMemoryReturnsProvider::new()
        .with_returns("AAPL.US", &wave(500, 0.012, 0.31))
        .with_returns("MSFT.US", &wave(500, 0.010, 0.17))
        .with_returns("CDR.PL", &wave(300, 0.020, 0.53))
        .with_returns("WIG20", &wave(800, 0.008, 0.11))
        .with_returns("^SPX", &wave(800, 0.007, 0.13))
}

fn request(use_interpolation: bool) -> SimulationRequest {
    let mut request = SimulationRequest::new(
        vec!["AAPL.US".into(), "MSFT.US".into(), "CDR.PL".into()],
        vec![0.4, 0.3, 0.3],
    );
    request.use_interpolation = use_interpolation;
    request.capital = 50_000.0;
    request.horizon_days = 60;
    request.ensemble_size = 500;
    request.calibration.trials = 300;
    request.seed = Some(7);
    request
}

#[tokio::test]
async fn test_run_without_interpolation_truncates() {
    let provider = provider();
    let result = run_simulation(&provider, &request(false)).await.unwrap();

    assert_eq!(result.history_days, 300);
    assert_eq!(result.notes(), &[AlignmentNote::Truncated { days: 300 }]);
    assert!(result.report_text().contains("analysis truncated to 300 days"));
    assert_eq!(provider.fetch_count("WIG20"), 0);
}

#[tokio::test]
async fn test_run_with_interpolation_patches_from_domestic_proxy() {
    let provider = provider();
    let result = run_simulation(&provider, &request(true)).await.unwrap();

    assert_eq!(result.history_days, 500);
    assert!(result.report_text().contains("CDR.PL: patched 200 days with WIG20 data"));
    assert_eq!(provider.fetch_count("WIG20"), 1);
    assert_eq!(provider.fetch_count("^SPX"), 0);
}

#[tokio::test]
async fn test_result_is_consistent() {
    let provider = provider();
    let result = run_simulation(&provider, &request(true)).await.unwrap();

    let ensemble = &result.ensemble;
    assert_eq!(ensemble.len(), 500);
    assert!(
        ensemble
            .paths()
            .iter()
            .all(|p| p.len() == 61 && p[0] == 50_000.0)
    );

    let params = result.calibration.params;
    assert!(params.alpha + params.beta < 0.999);
    assert!(params.omega >= 0.0);

    let summary = &result.summary;
    assert!(ensemble.terminal_values().contains(&summary.var));
    assert!(summary.cvar <= summary.var);
    assert_eq!(summary.confidence, 0.95);

    let text = result.report_text();
    assert!(text.contains("=== GARCH MODEL PARAMETERS ==="));
    assert!(text.contains("=== DATA QUALITY ==="));
}
