//! # Forecast
//!
//! $$
//! \hat y_{T+s}=c+\delta\,(T+s+1)+\sum_{j=1}^{p}A_j\,\hat y_{T+s-j}
//! $$
//!
//! Each forecast row feeds the lags of the following steps.

use nalgebra::DMatrix;

use super::model::ReducedFormVar;
use crate::error::VarError;
use crate::error::VarResult;

/// Forecast `steps` periods past the end of `y_history` (`T x K`). Only the
/// last `p` history rows enter the recursion; the trend index continues
/// from `T`.
pub fn forecast(
  model: &ReducedFormVar,
  y_history: &DMatrix<f64>,
  steps: usize,
) -> VarResult<DMatrix<f64>> {
  model.ensure_fitted()?;
  if steps == 0 {
    return Err(VarError::InvalidSpec("steps must be > 0".into()));
  }

  let p = model.spec.lag_order;
  if p == 0 {
    return Err(VarError::InvalidSpec("lags must be > 0 to forecast".into()));
  }

  let (t, k) = y_history.shape();
  if k != model.n_vars() {
    return Err(VarError::DimensionMismatch(format!(
      "history has {k} columns, model has {} variables",
      model.n_vars()
    )));
  }
  if t < p {
    return Err(VarError::DimensionMismatch(format!(
      "need at least {p} rows in history, got {t}"
    )));
  }

  let det = model.spec.deterministic;
  let c = model.deterministic_coefficients.as_ref();

  let mut buf = DMatrix::zeros(p + steps, k);
  for i in 0..p {
    buf.row_mut(i).copy_from(&y_history.row(t - p + i));
  }

  for step in 0..steps {
    let row = p + step;
    let t_idx = (t + step + 1) as f64;

    for eq in 0..k {
      let mut val = 0.0;

      if let Some(c) = c {
        if det.has_constant() {
          val += c[(eq, 0)];
        }
        if let Some(tc) = det.trend_column() {
          val += c[(eq, tc)] * t_idx;
        }
      }

      for (j, a) in model.lag_coefficients.iter().enumerate() {
        let prev = row - (j + 1);
        for var in 0..k {
          val += a[(eq, var)] * buf[(prev, var)];
        }
      }

      buf[(row, eq)] = val;
    }
  }

  Ok(buf.rows(p, steps).into_owned())
}
