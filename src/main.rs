//! # var-rs
//!
//! Fit a VAR to a CSV panel, then forecast, trace shocks into one response
//! variable and test every pair for Granger causality.

use std::fs;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use var_rs::io::export;
use var_rs::io::load::load_csv;
use var_rs::report;
use var_rs::series::TimeSeries;
use var_rs::var::check_stationarity;
use var_rs::var::AdfConfig;
use var_rs::var::DeterministicTerm;
use var_rs::var::EstimationConfig;
use var_rs::var::EstimatorExt;
use var_rs::var::GrangerCausalityTester;
use var_rs::var::GrangerConfig;
use var_rs::var::ModelSpec;
use var_rs::var::OlsEstimator;
use var_rs::var::ReducedFormExt;

#[derive(Parser, Debug)]
#[command(name = "var-rs")]
#[command(about = "Vector autoregression: estimate, forecast, IRF and Granger causality", long_about = None)]
struct Cli {
  /// CSV file with a header row of variable names
  #[arg(short, long)]
  input: PathBuf,

  /// Lag order p
  #[arg(short, long, default_value_t = 2)]
  lags: usize,

  /// Deterministic terms (none, const, trend, const-trend)
  #[arg(short, long, default_value = "const")]
  deterministic: String,

  /// Forecast steps
  #[arg(short, long, default_value_t = 10)]
  steps: usize,

  /// IRF horizon
  #[arg(long, default_value_t = 12)]
  horizon: usize,

  /// Response variable for the shock analysis, by name or index
  #[arg(short, long, default_value = "0")]
  response: String,

  /// Directory for forecast.csv, granger.csv and irf_analysis.csv
  #[arg(short, long)]
  out_dir: Option<PathBuf>,

  /// Granger significance level
  #[arg(long, default_value_t = 0.05)]
  alpha: f64,

  /// Relative singular value cutoff of the pseudoinverse fallback
  #[arg(long, default_value_t = 1e-12)]
  rank_tolerance: f64,

  /// Fit on first differences instead of levels
  #[arg(long)]
  difference: bool,

  /// Skip the console tables
  #[arg(short, long)]
  quiet: bool,
}

fn resolve_variable(ts: &TimeSeries, key: &str) -> Result<usize> {
  if let Some(i) = ts.index_of(key) {
    return Ok(i);
  }
  match key.parse::<usize>() {
    Ok(i) if i < ts.n_vars() => Ok(i),
    Ok(i) => bail!("variable index {i} out of range for {} variables", ts.n_vars()),
    Err(_) => bail!("unknown variable {key:?}"),
  }
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into()),
    )
    .init();

  let cli = Cli::parse();
  if !(cli.alpha > 0.0 && cli.alpha < 1.0) {
    bail!("alpha must be in (0, 1), got {}", cli.alpha);
  }

  let mut ts = load_csv(&cli.input)?;
  if cli.difference {
    ts = ts.difference().context("differencing failed")?;
  }
  tracing::info!(
    rows = ts.len(),
    vars = ts.n_vars(),
    names = ?ts.variable_names(),
    "loaded series"
  );

  let det = DeterministicTerm::parse(&cli.deterministic)?;
  let spec = ModelSpec::endogenous(cli.lags, det);
  let response = resolve_variable(&ts, &cli.response)?;

  let estimation = EstimationConfig {
    rank_tolerance: cli.rank_tolerance,
    ..EstimationConfig::default()
  };
  let granger_config = GrangerConfig {
    alpha: cli.alpha,
    rank_tolerance: cli.rank_tolerance,
    ..GrangerConfig::default()
  };

  // too-short series only lose the diagnostic, not the analysis
  let stationarity = match check_stationarity(
    &ts,
    AdfConfig {
      alpha: cli.alpha,
      ..AdfConfig::default()
    },
  ) {
    Ok(report) => Some(report),
    Err(e) => {
      tracing::warn!(error = %e, "stationarity check skipped");
      None
    }
  };

  let model = OlsEstimator::new(estimation)
    .estimate(&ts, spec)
    .context("estimation failed")?;
  let forecast = model
    .forecast(ts.observations(), cli.steps)
    .context("forecast failed")?;
  let shocks = model
    .analyze_shocks(response, cli.horizon)
    .context("shock analysis failed")?;
  let granger = GrangerCausalityTester::new(spec, granger_config)
    .test_all_pairs(&ts)
    .context("Granger causality tests failed")?;

  if !shocks.is_orthogonalized() {
    tracing::warn!("residual covariance not positive definite, shock analysis uses unit impulses");
  }

  let names = ts.variable_names();
  if !cli.quiet {
    if let Some(stationarity) = &stationarity {
      println!("ADF stationarity (alpha = {})", cli.alpha);
      report::stationarity_table(stationarity).printstd();
      println!();
    }
    report::print_summary(&model, &ts)?;
    println!("\nForecast ({} steps)", cli.steps);
    report::forecast_table(&forecast, names).printstd();
    println!("\nResponse of {} to each shock", names[response]);
    report::shock_table(&shocks, names).printstd();
    println!("\nGranger causality (alpha = {})", cli.alpha);
    report::granger_table(&granger).printstd();
  }

  if let Some(dir) = &cli.out_dir {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    export::write_analysis(dir, &forecast, &granger, &shocks, names)?;
  }

  Ok(())
}
