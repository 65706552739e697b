//! # Granger causality
//!
//! $$
//! F=\frac{(RSS_r-RSS_u)/q}{RSS_u/(T-p-m)}\sim F(q,\,T-p-m),\qquad q=p
//! $$
//!
//! The restricted regression drops every lag of the cause variable from the
//! effect equation; both regressions are refitted from the raw series and do
//! not reuse a fitted model's coefficients.

use nalgebra::DMatrix;
use rayon::prelude::*;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::FisherSnedecor;

use super::design::lagged_design;
use super::design::response_column;
use super::design::restricted_design;
use super::lstsq;
use super::model::ReducedFormExt;
use super::model::ReducedFormVar;
use super::spec::ModelSpec;
use crate::error::VarError;
use crate::error::VarResult;
use crate::series::TimeSeries;

/// Configuration for pairwise Granger causality tests.
#[derive(Debug, Clone, Copy)]
pub struct GrangerConfig {
  /// Significance level used to compute `significant`.
  pub alpha: f64,
  /// Relative singular-value cutoff for rank-deficient regressions.
  pub rank_tolerance: f64,
  /// Eigenvalue-ratio limit above which the normal equations are skipped.
  pub condition_limit: f64,
}

impl Default for GrangerConfig {
  fn default() -> Self {
    Self {
      alpha: 0.05,
      rank_tolerance: 1e-12,
      condition_limit: 1e16,
    }
  }
}

/// Result of one cause -> effect test.
#[derive(Debug, Clone, PartialEq)]
pub struct GrangerCausalityResult {
  pub cause_variable: String,
  pub effect_variable: String,
  /// F statistic; 0 when the regression is degenerate.
  pub f_statistic: f64,
  /// Upper-tail F(q, dof) probability, clamped to `[0, 1]`.
  pub p_value: f64,
  /// Lag order, equal to the restriction count q.
  pub lags_used: usize,
  /// Whether `p_value < alpha`.
  pub significant: bool,
}

/// `K x K` table of results indexed `[cause][effect]`, empty diagonal.
#[derive(Debug, Clone)]
pub struct GrangerMatrix {
  results: Vec<Vec<Option<GrangerCausalityResult>>>,
}

impl GrangerMatrix {
  pub fn n_vars(&self) -> usize {
    self.results.len()
  }

  pub fn get(&self, cause: usize, effect: usize) -> Option<&GrangerCausalityResult> {
    self.results.get(cause)?.get(effect)?.as_ref()
  }

  /// Off-diagonal results, cause-major.
  pub fn iter(&self) -> impl Iterator<Item = &GrangerCausalityResult> {
    self.results.iter().flatten().flatten()
  }

  pub fn significant(&self) -> impl Iterator<Item = &GrangerCausalityResult> {
    self.iter().filter(|r| r.significant)
  }
}

/// Pairwise restricted-vs-unrestricted F tests at a fixed lag order.
#[derive(Debug, Clone, Copy)]
pub struct GrangerCausalityTester {
  spec: ModelSpec,
  config: GrangerConfig,
}

impl GrangerCausalityTester {
  pub fn new(spec: ModelSpec, config: GrangerConfig) -> Self {
    Self { spec, config }
  }

  /// Tester using the lag order, deterministic terms and solver settings of
  /// a fitted model, keeping the tests comparable with its coefficients.
  /// `alpha` keeps its default.
  pub fn for_model(model: &ReducedFormVar) -> Self {
    let est = model.estimation_config();
    let config = GrangerConfig {
      rank_tolerance: est.rank_tolerance,
      condition_limit: est.condition_limit,
      ..GrangerConfig::default()
    };
    Self::new(model.spec(), config)
  }

  pub fn with_config(mut self, config: GrangerConfig) -> Self {
    self.config = config;
    self
  }

  pub fn spec(&self) -> ModelSpec {
    self.spec
  }

  pub fn config(&self) -> GrangerConfig {
    self.config
  }

  /// Does `cause` Granger-cause `effect`?
  pub fn test_pair(
    &self,
    ts: &TimeSeries,
    cause: usize,
    effect: usize,
  ) -> VarResult<GrangerCausalityResult> {
    self.spec.validate()?;

    let y = ts.observations();
    let (t, k) = y.shape();
    let p = self.spec.lag_order;
    let det = self.spec.deterministic;

    if cause >= k {
      return Err(VarError::DimensionMismatch(format!("cause index out of range: {cause}")));
    }
    if effect >= k {
      return Err(VarError::DimensionMismatch(format!("effect index out of range: {effect}")));
    }
    if cause == effect {
      return Err(VarError::InvalidInput(
        "cause and effect indices cannot be the same".into(),
      ));
    }
    if t <= p {
      return Err(VarError::InsufficientData {
        required: p + 1,
        actual: t,
      });
    }

    let t_reg = t - p;
    let m = self.spec.regressors(k);
    let dof = t_reg as i64 - m as i64;
    if dof <= 0 {
      return Err(VarError::InsufficientDegreesOfFreedom { dof });
    }

    let y_effect = response_column(y, p, effect);

    let x_u = lagged_design(y, p, det);
    let rss_u = self
      .rss(&x_u, &y_effect)
      .map_err(|e| e.context("failed to solve unrestricted model"))?;

    let x_r = restricted_design(y, p, det, cause);
    let rss_r = self
      .rss(&x_r, &y_effect)
      .map_err(|e| e.context("failed to solve restricted model"))?;

    let q = p as f64;
    let dof_f = dof as f64;
    let f = ((rss_r - rss_u) / q) / (rss_u / dof_f);

    let (f_statistic, p_value) = if f.is_finite() {
      let dist = FisherSnedecor::new(q, dof_f)
        .map_err(|e| VarError::NumericalFailure(format!("F distribution: {e}")))?;
      (f, dist.sf(f.max(0.0)).clamp(0.0, 1.0))
    } else {
      (0.0, 1.0)
    };

    let names = ts.variable_names();
    let result = GrangerCausalityResult {
      cause_variable: names[cause].clone(),
      effect_variable: names[effect].clone(),
      f_statistic,
      p_value,
      lags_used: p,
      significant: p_value < self.config.alpha,
    };

    tracing::debug!(
      cause = %result.cause_variable,
      effect = %result.effect_variable,
      f = result.f_statistic,
      p = result.p_value,
      "granger test"
    );

    Ok(result)
  }

  /// Every ordered pair `i != j`.
  pub fn test_all_pairs(&self, ts: &TimeSeries) -> VarResult<GrangerMatrix> {
    let k = ts.n_vars();
    let names = ts.variable_names();

    let pairs: Vec<(usize, usize)> = (0..k)
      .flat_map(|i| (0..k).filter(move |&j| j != i).map(move |j| (i, j)))
      .collect();

    let tested = pairs
      .par_iter()
      .map(|&(i, j)| {
        self
          .test_pair(ts, i, j)
          .map(|r| (i, j, r))
          .map_err(|e| e.context(format!("error testing {} -> {}", names[i], names[j])))
      })
      .collect::<VarResult<Vec<_>>>()?;

    let mut results = vec![vec![None; k]; k];
    for (i, j, r) in tested {
      results[i][j] = Some(r);
    }

    let matrix = GrangerMatrix { results };
    tracing::info!(
      pairs = pairs.len(),
      significant = matrix.significant().count(),
      "granger causality matrix complete"
    );
    Ok(matrix)
  }

  fn rss(&self, x: &DMatrix<f64>, y: &DMatrix<f64>) -> VarResult<f64> {
    let fit = lstsq::solve(x, y, self.config.rank_tolerance, self.config.condition_limit)?;
    Ok(fit.rss[0])
  }
}
