//! # OLS estimator
//!
//! $$
//! Y_{reg}=XB+U,\qquad \hat\Sigma_u=\frac{\hat U^\top\hat U}{T-p-(d+pK)}
//! $$
//!

use nalgebra::DMatrix;

use super::design::lagged_design;
use super::design::response_matrix;
use super::lstsq;
use super::model::ReducedFormVar;
use super::spec::EstimationConfig;
use super::spec::ModelSpec;
use crate::error::VarError;
use crate::error::VarResult;
use crate::series::TimeSeries;

/// Turns observed data into a reduced-form VAR.
pub trait EstimatorExt {
  fn estimate(&self, ts: &TimeSeries, spec: ModelSpec) -> VarResult<ReducedFormVar>;
}

/// Equation-by-equation OLS with a pseudoinverse fallback for singular
/// designs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OlsEstimator {
  pub config: EstimationConfig,
}

impl OlsEstimator {
  pub fn new(config: EstimationConfig) -> Self {
    Self { config }
  }
}

impl EstimatorExt for OlsEstimator {
  fn estimate(&self, ts: &TimeSeries, spec: ModelSpec) -> VarResult<ReducedFormVar> {
    spec.validate()?;

    let y = ts.observations();
    let (t, k) = y.shape();
    let p = spec.lag_order;
    if t <= p {
      return Err(VarError::InsufficientData {
        required: p + 1,
        actual: t,
      });
    }

    let det = spec.deterministic;
    let d = det.columns();
    let t_reg = t - p;
    let m = spec.regressors(k);

    let y_reg = response_matrix(y, p);
    let x = lagged_design(y, p, det);
    tracing::debug!(t, k, p, t_reg, regressors = m, "built VAR design");

    let fit = lstsq::solve(&x, &y_reg, self.config.rank_tolerance, self.config.condition_limit)?;
    let b = &fit.beta;

    let deterministic_coefficients =
      (d > 0).then(|| DMatrix::from_fn(k, d, |eq, col| b[(col, eq)]));

    let lag_coefficients = (0..p)
      .map(|j| {
        let offset = d + j * k;
        DMatrix::from_fn(k, k, |eq, var| b[(offset + var, eq)])
      })
      .collect();

    let dof = if t_reg > m { (t_reg - m) as f64 } else { t_reg as f64 };
    let utu = fit.residuals.transpose() * &fit.residuals;
    let mut residual_covariance = utu / dof;
    // exact symmetry for the Cholesky step
    residual_covariance = (&residual_covariance + residual_covariance.transpose()) * 0.5;

    tracing::info!(
      vars = k,
      lags = p,
      nobs = t_reg,
      dof,
      method = ?fit.method,
      "VAR estimated"
    );

    Ok(ReducedFormVar {
      spec,
      lag_coefficients,
      deterministic_coefficients,
      residual_covariance: Some(residual_covariance),
      residuals: Some(fit.residuals),
      nobs: t_reg,
      dof,
      solve_method: fit.method,
      estimation_config: self.config,
    })
  }
}
