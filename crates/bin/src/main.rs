//! Riskfolio CLI binary.
//!
//! Runs portfolio simulations and browses the instrument reference table.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use riskfolio::data::{
    ProxyConfig, ReturnsProvider, StooqReturnsProvider, YahooReturnsProvider,
};
use riskfolio::output::{
    ExportFormat, Exporter, PathSeriesExport, TerminalValuesExport,
};
use riskfolio::risk::{garch::DEFAULT_TRIALS, simulation::DEFAULT_ENSEMBLE_SIZE};
use riskfolio::{
    InstrumentTable, SimulationRequest, SimulationResult, equal_weights, run_simulation,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "riskfolio")]
#[command(about = "Riskfolio: GARCH Monte Carlo risk for multi-asset portfolios", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate future portfolio values and report VaR and CVaR
    Simulate {
        /// Instrument tickers or names, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        /// Portfolio weights, comma-separated (default: equal weights)
        #[arg(long, value_delimiter = ',')]
        weights: Vec<f64>,

        /// Starting capital
        #[arg(long, default_value_t = 10_000.0)]
        capital: f64,

        /// Trading days to simulate
        #[arg(long, default_value_t = 252)]
        horizon: usize,

        /// Years of price history
        #[arg(long, default_value_t = 5)]
        years: u32,

        /// Skip back-filling short histories from proxy indices
        #[arg(long)]
        no_interpolate: bool,

        /// Confidence level for VaR and CVaR
        #[arg(long, default_value_t = 0.95)]
        confidence: f64,

        /// Number of simulated paths
        #[arg(long, default_value_t = DEFAULT_ENSEMBLE_SIZE)]
        simulations: usize,

        /// Calibration trials
        #[arg(long, default_value_t = DEFAULT_TRIALS)]
        trials: usize,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Price data source
        #[arg(long, value_enum, default_value_t = ProviderKind::Stooq)]
        provider: ProviderKind,

        /// Instrument table used to resolve names (`name;symbol` lines)
        #[arg(long)]
        instruments: Option<PathBuf>,

        /// Directory for exported results
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Export format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },

    /// List instruments matching a query
    Instruments {
        /// Case-insensitive name or ticker fragment
        query: Option<String>,

        /// Instrument table file (`name;symbol` lines)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderKind {
    /// Yahoo Finance
    Yahoo,
    /// stooq.pl CSV downloads
    Stooq,
}

impl ProviderKind {
    /// Proxy tickers and suffix rules in the provider's ticker conventions.
    fn proxies(self) -> ProxyConfig {
        match self {
            Self::Yahoo => ProxyConfig::yahoo(),
            Self::Stooq => ProxyConfig::stooq(),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Simulate {
            symbols,
            weights,
            capital,
            horizon,
            years,
            no_interpolate,
            confidence,
            simulations,
            trials,
            seed,
            provider,
            instruments,
            export_dir,
            format,
        } => {
            let table = load_table(instruments.as_deref());
            let symbols: Vec<String> = symbols
                .iter()
                .map(|s| resolve_symbol(&table, s))
                .collect();
            let weights = if weights.is_empty() {
                equal_weights(symbols.len())
            } else {
                weights
            };

            let mut request = SimulationRequest::new(symbols, weights);
            request.capital = capital;
            request.horizon_days = horizon;
            request.history_years = years;
            request.use_interpolation = !no_interpolate;
            request.confidence = confidence;
            request.ensemble_size = simulations;
            request.calibration.trials = trials;
            request.seed = seed;

            request.proxies = provider.proxies();

            let provider: Box<dyn ReturnsProvider> = match provider {
                ProviderKind::Yahoo => Box::new(YahooReturnsProvider::new()?),
                ProviderKind::Stooq => Box::new(StooqReturnsProvider::new()?),
            };

            let result = simulate(provider.as_ref(), &request).await?;

            println!("{}", result.summary.to_ascii_table());
            println!("{}", result.report_text());

            if let Some(dir) = export_dir {
                export_results(&result, &dir, format)?;
                println!("Results exported to {}", dir.display());
            }
        }
        Commands::Instruments { query, file } => {
            let table = load_table(file.as_deref());
            let matches = table.search(query.as_deref().unwrap_or_default());
            if matches.is_empty() {
                println!("No instruments found.");
            }
            for instrument in matches {
                println!("{:<12} {}", instrument.symbol, instrument.name);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "riskfolio=debug"
    } else {
        "riskfolio=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_table(path: Option<&Path>) -> InstrumentTable {
    path.map_or_else(InstrumentTable::default, InstrumentTable::load_or_default)
}

/// Map a user-supplied name or ticker to a ticker, keeping it as given when
/// the table does not know it.
fn resolve_symbol(table: &InstrumentTable, input: &str) -> String {
    table.resolve(input).map_or_else(
        || input.trim().to_string(),
        |instrument| {
            debug!(input, symbol = %instrument.symbol, "resolved instrument");
            instrument.symbol.clone()
        },
    )
}

async fn simulate(
    provider: &dyn ReturnsProvider,
    request: &SimulationRequest,
) -> Result<SimulationResult, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!(
        "Simulating {} paths over {} days...",
        request.ensemble_size, request.horizon_days
    ));

    match run_simulation(provider, request).await {
        Ok(result) => {
            pb.finish_with_message(format!(
                "Simulated {} paths on {} days of history",
                result.ensemble.len(),
                result.history_days
            ));
            Ok(result)
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(e.into())
        }
    }
}

fn export_results(
    result: &SimulationResult,
    dir: &Path,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let ext = format.extension();

    result
        .summary
        .export_to_file(&dir.join(format!("summary.{ext}")), format)?;
    TerminalValuesExport::from_ensemble(&result.ensemble)
        .export_to_file(&dir.join(format!("terminal_values.{ext}")), format)?;
    if let Some(picks) = result.representative_paths() {
        PathSeriesExport::new(&result.ensemble, &picks, result.summary.capital)
            .export_to_file(&dir.join(format!("paths.{ext}")), format)?;
    }
    std::fs::write(dir.join("report.txt"), result.report_text())?;
    Ok(())
}
