//! # Reduced-form VAR
//!
//! $$
//! y_t=c+\delta t+A_1y_{t-1}+\cdots+A_py_{t-p}+u_t,\qquad u_t\sim(0,\Sigma_u)
//! $$
//!

use nalgebra::DMatrix;

use super::irf::ImpulseResponse;
use super::lstsq::SolveMethod;
use super::shocks::ShockAnalysis;
use super::shocks::ShockAnalyzer;
use super::spec::EstimationConfig;
use super::spec::ModelSpec;
use crate::error::VarError;
use crate::error::VarResult;

/// Capabilities every fitted reduced-form model exposes, whatever estimator
/// produced it.
pub trait ReducedFormExt {
  /// Specification the model was fitted with.
  fn spec(&self) -> ModelSpec;

  /// Lag coefficient matrices `A_1 .. A_p`.
  fn phi(&self) -> &[DMatrix<f64>];

  /// Residual covariance, if one was estimated.
  fn cov_u(&self) -> Option<&DMatrix<f64>>;

  /// `steps x K` recursive forecast continuing `y_history`.
  fn forecast(&self, y_history: &DMatrix<f64>, steps: usize) -> VarResult<DMatrix<f64>>;

  /// Response of all variables to a one-time shock in `shock_index`.
  fn impulse_response(&self, horizon: usize, shock_index: usize) -> VarResult<ImpulseResponse>;
}

/// VAR fitted by ordinary least squares (or assembled from known matrices).
#[derive(Debug, Clone)]
pub struct ReducedFormVar {
  pub(crate) spec: ModelSpec,
  pub(crate) lag_coefficients: Vec<DMatrix<f64>>,
  pub(crate) deterministic_coefficients: Option<DMatrix<f64>>,
  pub(crate) residual_covariance: Option<DMatrix<f64>>,
  pub(crate) residuals: Option<DMatrix<f64>>,
  pub(crate) nobs: usize,
  pub(crate) dof: f64,
  pub(crate) solve_method: SolveMethod,
  pub(crate) estimation_config: EstimationConfig,
}

impl ReducedFormVar {
  /// Assemble a model from known coefficients.
  ///
  /// Every lag matrix must be `K x K`, their count must equal the lag order,
  /// deterministic coefficients must be `K x d` and the covariance `K x K`.
  /// An empty `lag_coefficients` yields an unfitted model on which every
  /// operation reports [`VarError::ModelNotFit`].
  pub fn from_parts(
    spec: ModelSpec,
    lag_coefficients: Vec<DMatrix<f64>>,
    deterministic_coefficients: Option<DMatrix<f64>>,
    residual_covariance: Option<DMatrix<f64>>,
  ) -> VarResult<Self> {
    if let Some(first) = lag_coefficients.first() {
      let k = first.nrows();
      if lag_coefficients.len() != spec.lag_order {
        return Err(VarError::DimensionMismatch(format!(
          "{} lag matrices for lag order {}",
          lag_coefficients.len(),
          spec.lag_order
        )));
      }
      if let Some(j) = lag_coefficients.iter().position(|a| a.shape() != (k, k)) {
        return Err(VarError::DimensionMismatch(format!(
          "A_{} is {:?}, expected {k}x{k}",
          j + 1,
          lag_coefficients[j].shape()
        )));
      }
      if let Some(c) = &deterministic_coefficients {
        if c.shape() != (k, spec.deterministic.columns()) {
          return Err(VarError::DimensionMismatch(format!(
            "deterministic coefficients are {:?}, expected {k}x{}",
            c.shape(),
            spec.deterministic.columns()
          )));
        }
      }
      if let Some(s) = &residual_covariance {
        if s.shape() != (k, k) {
          return Err(VarError::DimensionMismatch(format!(
            "residual covariance is {:?}, expected {k}x{k}",
            s.shape()
          )));
        }
      }
    }

    Ok(Self {
      spec,
      lag_coefficients,
      deterministic_coefficients,
      residual_covariance,
      residuals: None,
      nobs: 0,
      dof: 0.0,
      solve_method: SolveMethod::NormalEquations,
      estimation_config: EstimationConfig::default(),
    })
  }

  pub fn is_fitted(&self) -> bool {
    !self.lag_coefficients.is_empty()
  }

  /// Number of variables K.
  pub fn n_vars(&self) -> usize {
    self.lag_coefficients.first().map_or(0, |a| a.nrows())
  }

  pub fn lag_coefficients(&self) -> &[DMatrix<f64>] {
    &self.lag_coefficients
  }

  /// `K x d` coefficients of `[constant, trend]`, absent when `d = 0`.
  pub fn deterministic_coefficients(&self) -> Option<&DMatrix<f64>> {
    self.deterministic_coefficients.as_ref()
  }

  pub fn residual_covariance(&self) -> Option<&DMatrix<f64>> {
    self.residual_covariance.as_ref()
  }

  /// In-sample residuals (`T - p` rows), only present for estimated models.
  pub fn residuals(&self) -> Option<&DMatrix<f64>> {
    self.residuals.as_ref()
  }

  /// Regression observations `T - p` used in estimation.
  pub fn nobs(&self) -> usize {
    self.nobs
  }

  /// Divisor applied to `U'U` for the residual covariance.
  pub fn dof(&self) -> f64 {
    self.dof
  }

  pub fn solve_method(&self) -> SolveMethod {
    self.solve_method
  }

  /// Solver settings the coefficients were estimated with; defaults for
  /// assembled models.
  pub fn estimation_config(&self) -> EstimationConfig {
    self.estimation_config
  }

  pub(crate) fn ensure_fitted(&self) -> VarResult<()> {
    if self.is_fitted() {
      Ok(())
    } else {
      Err(VarError::ModelNotFit)
    }
  }

  /// IRF paths of `response_index` for a shock in every variable.
  pub fn analyze_shocks(&self, response_index: usize, horizon: usize) -> VarResult<ShockAnalysis> {
    ShockAnalyzer::new(self).analyze(response_index, horizon)
  }
}

impl ReducedFormExt for ReducedFormVar {
  fn spec(&self) -> ModelSpec {
    self.spec
  }

  fn phi(&self) -> &[DMatrix<f64>] {
    &self.lag_coefficients
  }

  fn cov_u(&self) -> Option<&DMatrix<f64>> {
    self.residual_covariance.as_ref()
  }

  fn forecast(&self, y_history: &DMatrix<f64>, steps: usize) -> VarResult<DMatrix<f64>> {
    super::forecast::forecast(self, y_history, steps)
  }

  fn impulse_response(&self, horizon: usize, shock_index: usize) -> VarResult<ImpulseResponse> {
    super::irf::impulse_response(self, horizon, shock_index)
  }
}

#[cfg(test)]
mod tests {
  use nalgebra::DMatrix;

  use super::ReducedFormExt;
  use super::ReducedFormVar;
  use crate::error::ErrorKind;
  use crate::var::spec::DeterministicTerm;
  use crate::var::spec::ModelSpec;

  #[test]
  fn unfitted_model_rejects_every_operation() {
    let spec = ModelSpec::endogenous(1, DeterministicTerm::None);
    let model = ReducedFormVar::from_parts(spec, vec![], None, None).unwrap();
    assert!(!model.is_fitted());

    let y = DMatrix::zeros(3, 1);
    assert_eq!(model.forecast(&y, 2).unwrap_err().kind(), ErrorKind::ModelNotFit);
    assert_eq!(model.impulse_response(4, 0).unwrap_err().kind(), ErrorKind::ModelNotFit);
    assert_eq!(model.analyze_shocks(0, 4).unwrap_err().kind(), ErrorKind::ModelNotFit);
  }

  #[test]
  fn from_parts_checks_shapes() {
    let spec = ModelSpec::endogenous(2, DeterministicTerm::Constant);
    let a = DMatrix::identity(2, 2);

    let wrong_count = ReducedFormVar::from_parts(spec, vec![a.clone()], None, None);
    assert_eq!(wrong_count.unwrap_err().kind(), ErrorKind::DimensionMismatch);

    let wrong_det =
      ReducedFormVar::from_parts(spec, vec![a.clone(), a.clone()], Some(DMatrix::zeros(2, 2)), None);
    assert_eq!(wrong_det.unwrap_err().kind(), ErrorKind::DimensionMismatch);

    let ok = ReducedFormVar::from_parts(spec, vec![a.clone(), a], Some(DMatrix::zeros(2, 1)), None).unwrap();
    assert_eq!(ok.n_vars(), 2);
    assert_eq!(ok.phi().len(), 2);
  }
}
