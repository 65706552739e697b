//! # Stationarity diagnostics
//!
//! $$
//! \Delta y_t=\alpha+\beta t+\gamma y_{t-1}+\sum_{i=1}^{l}\delta_i\Delta y_{t-i}+\varepsilon_t,
//! \qquad \tau=\hat\gamma/\mathrm{se}(\hat\gamma)
//! $$
//!
//! Augmented Dickey-Fuller test run on every variable before the VAR is
//! used for Granger causality. A series that keeps its unit root should be
//! differenced first.

use nalgebra::DMatrix;
use rayon::prelude::*;

use super::spec::DeterministicTerm;
use crate::error::VarError;
use crate::error::VarResult;
use crate::series::TimeSeries;

/// Shortest series the test accepts.
pub const MIN_OBSERVATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagSelection {
  Fixed(usize),
  Aic,
  Bic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValues {
  pub one_percent: f64,
  pub five_percent: f64,
  pub ten_percent: f64,
}

impl CriticalValues {
  /// Asymptotic MacKinnon values for the regression's deterministic terms.
  pub fn for_terms(det: DeterministicTerm) -> VarResult<Self> {
    match det {
      DeterministicTerm::None => Ok(Self {
        one_percent: -2.58,
        five_percent: -1.95,
        ten_percent: -1.62,
      }),
      DeterministicTerm::Constant => Ok(Self {
        one_percent: -3.43,
        five_percent: -2.86,
        ten_percent: -2.57,
      }),
      DeterministicTerm::ConstantTrend => Ok(Self {
        one_percent: -3.96,
        five_percent: -3.41,
        ten_percent: -3.13,
      }),
      DeterministicTerm::Trend => Err(VarError::InvalidSpec(
        "ADF regression needs none, const or const-trend terms".into(),
      )),
    }
  }

  pub fn value_at(self, alpha: f64) -> f64 {
    if alpha <= 0.01 {
      self.one_percent
    } else if alpha <= 0.05 {
      self.five_percent
    } else {
      self.ten_percent
    }
  }
}

/// Configuration for the Augmented Dickey-Fuller unit-root test.
#[derive(Debug, Clone, Copy)]
pub struct AdfConfig {
  pub deterministic: DeterministicTerm,
  pub lag_selection: LagSelection,
  /// Upper bound for automatic selection, Schwert's rule when `None`.
  pub max_lags: Option<usize>,
  /// Significance level used to compute `stationary`.
  pub alpha: f64,
}

impl Default for AdfConfig {
  fn default() -> Self {
    Self {
      deterministic: DeterministicTerm::Constant,
      lag_selection: LagSelection::Aic,
      max_lags: None,
      alpha: 0.05,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
  /// t statistic of the lagged level; NaN when its standard error vanishes.
  pub statistic: f64,
  pub used_lags: usize,
  pub nobs: usize,
  pub critical_values: CriticalValues,
  /// Unit root rejected at `alpha`.
  pub stationary: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableStationarity {
  pub variable: String,
  pub adf: AdfResult,
}

/// Per-variable ADF results in column order.
#[derive(Debug, Clone)]
pub struct StationarityReport {
  pub results: Vec<VariableStationarity>,
  pub alpha: f64,
}

impl StationarityReport {
  pub fn all_stationary(&self) -> bool {
    self.results.iter().all(|r| r.adf.stationary)
  }

  pub fn non_stationary(&self) -> impl Iterator<Item = &VariableStationarity> {
    self.results.iter().filter(|r| !r.adf.stationary)
  }
}

struct AdfFit {
  statistic: f64,
  nobs: usize,
  sse: f64,
  regressors: usize,
}

pub fn schwert_max_lags(n: usize) -> usize {
  if n <= 1 {
    return 0;
  }
  (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

/// `[1]? [t]? y_{t-1} dy_{t-1} .. dy_{t-l}` against `dy_t`.
fn adf_design(y: &[f64], lags: usize, det: DeterministicTerm) -> (DMatrix<f64>, DMatrix<f64>) {
  let dy: Vec<f64> = y.windows(2).map(|w| w[1] - w[0]).collect();
  let rows = dy.len().saturating_sub(lags);
  let m = det.columns() + 1 + lags;

  let lhs = DMatrix::from_fn(rows, 1, |r, _| dy[r + lags]);
  let mut x = DMatrix::zeros(rows, m);
  for r in 0..rows {
    let t = r + lags;
    let mut col = 0;
    if det.has_constant() {
      x[(r, col)] = 1.0;
      col += 1;
    }
    if det.has_trend() {
      x[(r, col)] = (t + 1) as f64;
      col += 1;
    }
    // dy[t] = y[t + 1] - y[t], so y[t] is the lagged level
    x[(r, col)] = y[t];
    col += 1;
    for i in 1..=lags {
      x[(r, col)] = dy[t - i];
      col += 1;
    }
  }
  (lhs, x)
}

fn fit_adf(y: &[f64], lags: usize, det: DeterministicTerm) -> VarResult<AdfFit> {
  let (lhs, x) = adf_design(y, lags, det);
  let (n, m) = x.shape();
  if n <= m {
    return Err(VarError::InsufficientDegreesOfFreedom {
      dof: n as i64 - m as i64,
    });
  }

  let xt = x.transpose();
  let xtx_inv = (&xt * &x)
    .try_inverse()
    .ok_or_else(|| VarError::NumericalFailure("singular ADF design".into()))?;
  let beta = &xtx_inv * (&xt * &lhs);
  let residuals = &lhs - &x * &beta;
  let sse = residuals.iter().map(|u| u * u).sum::<f64>();
  let sigma2 = (sse / (n - m) as f64).max(0.0);

  let gamma_index = det.columns();
  let se = (xtx_inv[(gamma_index, gamma_index)] * sigma2).max(0.0).sqrt();
  let statistic = if se > 0.0 { beta[(gamma_index, 0)] / se } else { f64::NAN };

  Ok(AdfFit {
    statistic,
    nobs: n,
    sse,
    regressors: m,
  })
}

fn information_criterion(fit: &AdfFit, selection: LagSelection) -> f64 {
  let n = fit.nobs as f64;
  let penalty = match selection {
    LagSelection::Bic => n.ln(),
    _ => 2.0,
  };
  n * (fit.sse / n).ln() + penalty * fit.regressors as f64
}

fn choose_lag(y: &[f64], cfg: &AdfConfig, max_lags: usize) -> usize {
  let mut best = (0, f64::INFINITY);
  for lag in 0..=max_lags {
    // lags too long for the sample or with a singular design are skipped
    let Ok(fit) = fit_adf(y, lag, cfg.deterministic) else {
      continue;
    };
    let ic = information_criterion(&fit, cfg.lag_selection);
    if ic < best.1 {
      best = (lag, ic);
    }
  }
  best.0
}

/// Augmented Dickey-Fuller test on a single series.
pub fn adf_test(y: &[f64], cfg: AdfConfig) -> VarResult<AdfResult> {
  if y.len() < MIN_OBSERVATIONS {
    return Err(VarError::InsufficientData {
      required: MIN_OBSERVATIONS,
      actual: y.len(),
    });
  }
  if !(cfg.alpha > 0.0 && cfg.alpha < 1.0) {
    return Err(VarError::InvalidSpec(format!("alpha must be in (0, 1), got {}", cfg.alpha)));
  }
  let critical_values = CriticalValues::for_terms(cfg.deterministic)?;

  let max_possible = y.len().saturating_sub(5);
  let used_lags = match cfg.lag_selection {
    LagSelection::Fixed(p) if p > max_possible => {
      return Err(VarError::InvalidSpec(format!(
        "ADF lag order {p} too large for {} observations",
        y.len()
      )));
    }
    LagSelection::Fixed(p) => p,
    _ => {
      let max_lags = cfg.max_lags.unwrap_or_else(|| schwert_max_lags(y.len())).min(max_possible);
      choose_lag(y, &cfg, max_lags)
    }
  };

  let fit = fit_adf(y, used_lags, cfg.deterministic)?;
  let stationary = fit.statistic < critical_values.value_at(cfg.alpha);
  Ok(AdfResult {
    statistic: fit.statistic,
    used_lags,
    nobs: fit.nobs,
    critical_values,
    stationary,
  })
}

/// Run [`adf_test`] on every column of `ts`.
pub fn check_stationarity(ts: &TimeSeries, cfg: AdfConfig) -> VarResult<StationarityReport> {
  let y = ts.observations();
  let names = ts.variable_names();

  let results = (0..ts.n_vars())
    .into_par_iter()
    .map(|k| {
      let column: Vec<f64> = y.column(k).iter().copied().collect();
      let adf = adf_test(&column, cfg).map_err(|e| e.context(format!("ADF test failed for {}", names[k])))?;
      Ok(VariableStationarity {
        variable: names[k].clone(),
        adf,
      })
    })
    .collect::<VarResult<Vec<_>>>()?;

  let report = StationarityReport {
    results,
    alpha: cfg.alpha,
  };
  for r in report.non_stationary() {
    tracing::warn!(
      variable = %r.variable,
      statistic = r.adf.statistic,
      "unit root not rejected, apply differencing before Granger causality"
    );
  }
  Ok(report)
}
