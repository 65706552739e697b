//! Console tables for fitted models and analysis results.

use nalgebra::DMatrix;
use prettytable::format;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;

use crate::error::VarResult;
use crate::series::TimeSeries;
use crate::var::diagnostics::StationarityReport;
use crate::var::granger::GrangerMatrix;
use crate::var::irf::ImpulseResponse;
use crate::var::model::ReducedFormVar;
use crate::var::shocks::ShockAnalysis;

fn new_table(titles: Vec<String>) -> Table {
  let mut table = Table::new();
  table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
  table.set_titles(Row::new(titles.iter().map(|t| Cell::new(t)).collect()));
  table
}

fn num(v: f64) -> Cell {
  Cell::new(&format!("{v:.6}")).style_spec("r")
}

fn column_names(names: &[String], k: usize) -> Vec<String> {
  (0..k)
    .map(|i| names.get(i).cloned().unwrap_or_else(|| format!("Var{}", i + 1)))
    .collect()
}

/// Rows labelled by `row_label`, columns by variable name.
fn matrix_table(corner: &str, row_label: impl Fn(usize) -> String, m: &DMatrix<f64>, names: &[String]) -> Table {
  let mut titles = vec![corner.to_string()];
  titles.extend(column_names(names, m.ncols()));
  let mut table = new_table(titles);
  for (i, row) in m.row_iter().enumerate() {
    let mut cells = vec![Cell::new(&row_label(i))];
    cells.extend(row.iter().map(|&v| num(v)));
    table.add_row(Row::new(cells));
  }
  table
}

/// Lag coefficient block `A_j`, equations by row.
pub fn coefficient_table(a: &DMatrix<f64>, names: &[String]) -> Table {
  let labels = column_names(names, a.nrows());
  matrix_table("equation", |i| labels[i].clone(), a, names)
}

pub fn covariance_table(sigma: &DMatrix<f64>, names: &[String]) -> Table {
  let labels = column_names(names, sigma.nrows());
  matrix_table("", |i| labels[i].clone(), sigma, names)
}

/// Forecast path, steps numbered from 1.
pub fn forecast_table(forecast: &DMatrix<f64>, names: &[String]) -> Table {
  matrix_table("step", |s| (s + 1).to_string(), forecast, names)
}

/// Responses of every variable to a single shock.
pub fn irf_table(irf: &ImpulseResponse, names: &[String]) -> Table {
  matrix_table("h", |h| h.to_string(), &irf.responses, names)
}

/// Responses of one variable to every shock.
pub fn shock_table(analysis: &ShockAnalysis, names: &[String]) -> Table {
  let mut titles = vec!["h".to_string()];
  titles.extend(
    analysis
      .series
      .keys()
      .map(|&s| format!("shock {}", column_names(names, s + 1)[s])),
  );
  let mut table = new_table(titles);
  for h in 0..analysis.horizon {
    let mut cells = vec![Cell::new(&h.to_string())];
    cells.extend(
      analysis
        .series
        .values()
        .map(|path| path.get(h).map_or_else(|| Cell::new("-"), |&v| num(v))),
    );
    table.add_row(Row::new(cells));
  }
  table
}

pub fn granger_table(results: &GrangerMatrix) -> Table {
  let titles = ["cause", "effect", "F", "p-value", "lags", "significant"]
    .iter()
    .map(|s| s.to_string())
    .collect();
  let mut table = new_table(titles);
  for r in results.iter() {
    table.add_row(Row::new(vec![
      Cell::new(&r.cause_variable),
      Cell::new(&r.effect_variable),
      num(r.f_statistic),
      num(r.p_value),
      Cell::new(&r.lags_used.to_string()).style_spec("r"),
      Cell::new(if r.significant { "yes" } else { "no" }),
    ]));
  }
  table
}

/// ADF statistic per variable against the critical value at the report's
/// significance level.
pub fn stationarity_table(report: &StationarityReport) -> Table {
  let titles = ["variable", "ADF", "critical", "lags", "nobs", "stationary"]
    .iter()
    .map(|s| s.to_string())
    .collect();
  let mut table = new_table(titles);
  for r in &report.results {
    table.add_row(Row::new(vec![
      Cell::new(&r.variable),
      num(r.adf.statistic),
      num(r.adf.critical_values.value_at(report.alpha)),
      Cell::new(&r.adf.used_lags.to_string()).style_spec("r"),
      Cell::new(&r.adf.nobs.to_string()).style_spec("r"),
      Cell::new(if r.adf.stationary { "yes" } else { "no, difference" }),
    ]));
  }
  table
}

/// Print lag matrices, deterministic terms, residual covariance, stability
/// and sample information of a fitted model.
pub fn print_summary(model: &ReducedFormVar, ts: &TimeSeries) -> VarResult<()> {
  model.ensure_fitted()?;
  let names = ts.variable_names();
  let spec = model.spec;

  println!(
    "VAR({}) with {:?} deterministic term, {} variables",
    spec.lag_order,
    spec.deterministic,
    model.n_vars()
  );
  println!(
    "Observations: {} (regression rows {}), covariance divisor {}",
    ts.len(),
    model.nobs(),
    model.dof()
  );
  println!("Solver: {:?}", model.solve_method());

  for (j, a) in model.lag_coefficients().iter().enumerate() {
    println!("\nA_{}", j + 1);
    coefficient_table(a, names).printstd();
  }

  if let Some(c) = model.deterministic_coefficients() {
    println!("\nDeterministic terms");
    let mut terms = Vec::new();
    if spec.deterministic.has_constant() {
      terms.push("const".to_string());
    }
    if spec.deterministic.has_trend() {
      terms.push("trend".to_string());
    }
    coefficient_table(&c.transpose(), &terms).printstd();
  }

  if let Some(sigma) = model.residual_covariance() {
    println!("\nResidual covariance");
    covariance_table(sigma, names).printstd();
  }

  match model.max_root_modulus() {
    Ok(m) => println!(
      "\nLargest companion root modulus {m:.6}: {}",
      if m < 1.0 { "stable" } else { "not stable" }
    ),
    Err(e) => tracing::warn!(error = %e, "stability check failed"),
  }

  Ok(())
}
