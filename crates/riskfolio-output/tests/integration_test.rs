//! Integration tests for reporting and export of a simulated run.

use riskfolio_data::AlignmentNote;
use riskfolio_output::{
    DiagnosticReport, ExportFormat, Exporter, PathSeriesExport, RepresentativePaths, RiskSummary,
    TerminalValuesExport,
};
use riskfolio_risk::{
    CalibrationConfig, GarchCalibrator, MonteCarloConfig, MonteCarloSimulator,
};

fn portfolio_returns() -> Vec<f64> {
    (0..500)
        .map(|i| {
            let t = f64::from(i);
            0.01 * (t * 0.3).sin() + 0.004 * (t * 1.7).cos() + 0.0002
        })
        .collect()
}

#[test]
fn test_full_reporting_workflow() {
    let returns = portfolio_returns();
    let calibration = GarchCalibrator::new(CalibrationConfig {
        trials: 300,
        seed: Some(3),
    })
    .calibrate(&returns);

    let ensemble = MonteCarloSimulator::new(MonteCarloConfig {
        ensemble_size: 1_000,
        seed: Some(3),
    })
    .simulate(20_000.0, 252, 0.0002, &calibration.params);

    let summary = RiskSummary::from_ensemble(20_000.0, &ensemble, 0.95);
    assert_eq!(summary.paths, 1_000);
    assert!(summary.min <= summary.cvar);
    assert!(summary.cvar <= summary.var);
    assert!(summary.var <= summary.max);

    let picks = RepresentativePaths::select(&ensemble, &summary).unwrap();
    assert_eq!(ensemble.terminal_values()[picks.best], summary.max);

    let chart = PathSeriesExport::new(&ensemble, &picks, 20_000.0);
    // 253 values per path, sampled every day, for five series.
    assert_eq!(chart.points.len(), 5 * 253);

    let terminal_csv = TerminalValuesExport::from_ensemble(&ensemble)
        .export_to_string(ExportFormat::Csv)
        .unwrap();
    assert_eq!(terminal_csv.lines().count(), 1_001);

    let report = DiagnosticReport::builder()
        .symbols(vec!["AAPL.US".to_string(), "CDR.PL".to_string()])
        .calibration(calibration)
        .notes([AlignmentNote::Patched {
            symbol: "CDR.PL".to_string(),
            days: 200,
            proxy: "WIG20".to_string(),
        }])
        .build()
        .unwrap();

    let text = report.to_text();
    assert!(text.contains("Portfolio: [AAPL.US, CDR.PL]"));
    assert!(text.contains("CDR.PL: patched 200 days with WIG20 data"));

    let json = report.to_json().unwrap();
    assert!(json.contains("\"symbols\""));
}
