//! Regressor layout shared by the estimator and the Granger tester.
//!
//! Row `t` of the design (for `t = 0..T-p`) explains observation `t + p`:
//! `[1]? [t + p + 1]? y_{t+p-1} ... y_{t}`, each lag block holding the
//! variables in column order.

use nalgebra::DMatrix;

use super::spec::DeterministicTerm;

/// Responses `Y_reg`, rows `p..T` of the observations.
pub fn response_matrix(y: &DMatrix<f64>, lags: usize) -> DMatrix<f64> {
  let t_reg = y.nrows().saturating_sub(lags);
  DMatrix::from_fn(t_reg, y.ncols(), |t, k| y[(t + lags, k)])
}

/// Single response column, rows `p..T`, as a `T - p x 1` matrix.
pub fn response_column(y: &DMatrix<f64>, lags: usize, column: usize) -> DMatrix<f64> {
  let t_reg = y.nrows().saturating_sub(lags);
  DMatrix::from_fn(t_reg, 1, |t, _| y[(t + lags, column)])
}

/// Full design matrix with deterministic columns followed by `lags` blocks
/// of all variables.
pub fn lagged_design(y: &DMatrix<f64>, lags: usize, det: DeterministicTerm) -> DMatrix<f64> {
  build(y, lags, det, None)
}

/// Design matrix with every lag of `excluded` removed.
pub fn restricted_design(
  y: &DMatrix<f64>,
  lags: usize,
  det: DeterministicTerm,
  excluded: usize,
) -> DMatrix<f64> {
  build(y, lags, det, Some(excluded))
}

fn build(
  y: &DMatrix<f64>,
  lags: usize,
  det: DeterministicTerm,
  excluded: Option<usize>,
) -> DMatrix<f64> {
  let k = y.ncols();
  let kept = k - excluded.map_or(0, |_| 1);
  let t_reg = y.nrows().saturating_sub(lags);
  let m = det.columns() + lags * kept;

  let mut x = DMatrix::zeros(t_reg, m);
  for t in 0..t_reg {
    let mut col = 0;

    if det.has_constant() {
      x[(t, col)] = 1.0;
      col += 1;
    }
    if det.has_trend() {
      // 1-based absolute period of the explained observation
      x[(t, col)] = (t + lags + 1) as f64;
      col += 1;
    }

    for j in 1..=lags {
      let src = t + lags - j;
      for var in 0..k {
        if Some(var) == excluded {
          continue;
        }
        x[(t, col)] = y[(src, var)];
        col += 1;
      }
    }
  }

  x
}

#[cfg(test)]
mod tests {
  use nalgebra::DMatrix;

  use super::lagged_design;
  use super::response_matrix;
  use super::response_column;
  use super::restricted_design;
  use crate::var::spec::DeterministicTerm;

  fn sample() -> DMatrix<f64> {
    // y_t = (t, 10 t)
    DMatrix::from_fn(5, 2, |t, k| if k == 0 { t as f64 } else { 10.0 * t as f64 })
  }

  #[test]
  fn response_skips_lagged_rows() {
    let y = sample();
    let r = response_matrix(&y, 2);
    assert_eq!(r.shape(), (3, 2));
    assert_eq!(r[(0, 0)], 2.0);
    assert_eq!(r[(2, 1)], 40.0);

    let v = response_column(&y, 2, 1);
    assert_eq!(v.as_slice(), &[20.0, 30.0, 40.0]);
  }

  #[test]
  fn design_orders_deterministic_then_lags() {
    let y = sample();
    let x = lagged_design(&y, 2, DeterministicTerm::ConstantTrend);
    assert_eq!(x.shape(), (3, 6));

    // row 0 explains t = 2: [1, 3, y_1, y_0]
    assert_eq!(x.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 3.0, 1.0, 10.0, 0.0, 0.0]);
    // row 2 explains t = 4: [1, 5, y_3, y_2]
    assert_eq!(x.row(2).iter().copied().collect::<Vec<_>>(), vec![1.0, 5.0, 3.0, 30.0, 2.0, 20.0]);
  }

  #[test]
  fn trend_only_design() {
    let y = sample();
    let x = lagged_design(&y, 1, DeterministicTerm::Trend);
    assert_eq!(x.shape(), (4, 3));
    assert_eq!(x[(0, 0)], 2.0);
    assert_eq!(x[(3, 0)], 5.0);
  }

  #[test]
  fn restricted_design_drops_every_lag_of_cause() {
    let y = sample();
    let x = restricted_design(&y, 2, DeterministicTerm::Constant, 0);
    assert_eq!(x.shape(), (3, 3));
    assert_eq!(x.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 10.0, 0.0]);
    assert_eq!(x.row(1).iter().copied().collect::<Vec<_>>(), vec![1.0, 20.0, 10.0]);
  }
}
