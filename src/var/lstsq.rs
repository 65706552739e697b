//! # Least squares
//!
//! $$
//! \hat B=(X^\top X)^{-1}X^\top Y \quad\text{or}\quad \hat B=V_r\Sigma_r^{-1}U_r^\top Y
//! $$
//!
//! Normal equations when `X'X` is invertible and well conditioned, otherwise
//! the minimum-norm solution through a rank-truncated SVD.

use nalgebra::DMatrix;

use crate::error::VarError;
use crate::error::VarResult;

/// How a coefficient matrix was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
  NormalEquations,
  /// SVD minimum-norm solution with the effective numerical rank used.
  Pseudoinverse { rank: usize },
}

#[derive(Debug, Clone)]
pub struct LeastSquares {
  /// Coefficients, one column per response (`m x n_responses`).
  pub beta: DMatrix<f64>,
  pub residuals: DMatrix<f64>,
  /// Residual sum of squares per response column.
  pub rss: Vec<f64>,
  pub method: SolveMethod,
}

/// Solve `X B ~ Y` column by column in the least-squares sense.
pub fn solve(
  x: &DMatrix<f64>,
  y: &DMatrix<f64>,
  rank_tolerance: f64,
  condition_limit: f64,
) -> VarResult<LeastSquares> {
  if x.nrows() != y.nrows() {
    return Err(VarError::DimensionMismatch(format!(
      "design has {} rows, response has {}",
      x.nrows(),
      y.nrows()
    )));
  }

  let (beta, method) = match normal_equations(x, y, condition_limit) {
    Some(beta) => (beta, SolveMethod::NormalEquations),
    None => {
      let (beta, rank) = pseudoinverse_solve(x, y, rank_tolerance)?;
      tracing::warn!(
        rows = x.nrows(),
        cols = x.ncols(),
        rank,
        "X'X singular or ill-conditioned, using SVD least squares"
      );
      (beta, SolveMethod::Pseudoinverse { rank })
    }
  };

  let residuals = y - x * &beta;
  let rss = residuals
    .column_iter()
    .map(|c| c.iter().map(|u| u * u).sum())
    .collect();

  Ok(LeastSquares {
    beta,
    residuals,
    rss,
    method,
  })
}

fn normal_equations(x: &DMatrix<f64>, y: &DMatrix<f64>, condition_limit: f64) -> Option<DMatrix<f64>> {
  if x.ncols() == 0 || x.nrows() < x.ncols() {
    return None;
  }

  let xt = x.transpose();
  let xtx = &xt * x;

  let eig = xtx.symmetric_eigenvalues();
  let max_eig = eig.iter().fold(0.0_f64, |a, &b| a.max(b.abs()));
  let min_eig = eig.iter().fold(f64::INFINITY, |a, &b| a.min(b));
  if !(min_eig > 0.0) || max_eig / min_eig > condition_limit {
    return None;
  }

  let inv = xtx.try_inverse()?;
  let beta = inv * (xt * y);
  beta.iter().all(|v| v.is_finite()).then_some(beta)
}

/// Minimum-norm solution keeping singular values above
/// `rank_tolerance * sigma_max`. A numerically zero design yields `B = 0`.
pub fn pseudoinverse_solve(
  x: &DMatrix<f64>,
  y: &DMatrix<f64>,
  rank_tolerance: f64,
) -> VarResult<(DMatrix<f64>, usize)> {
  let (n, m) = x.shape();
  let zero = DMatrix::zeros(m, y.ncols());
  if n == 0 || m == 0 {
    return Ok((zero, 0));
  }

  let svd = x
    .clone()
    .try_svd(true, true, f64::EPSILON, 0)
    .ok_or_else(|| VarError::NumericalFailure("X'X singular and SVD factorization failed".into()))?;
  let (Some(u), Some(v_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
    return Err(VarError::NumericalFailure("SVD did not produce singular vectors".into()));
  };

  let sigma = &svd.singular_values;
  let sigma_max = sigma.iter().fold(0.0_f64, |a, &b| a.max(b));
  if !(sigma_max > 0.0) {
    return Ok((zero, 0));
  }

  let cutoff = rank_tolerance * sigma_max;
  let kept: Vec<usize> = (0..sigma.len()).filter(|&i| sigma[i] > cutoff).collect();
  if kept.is_empty() {
    return Ok((zero, 0));
  }

  // B = sum_i v_i (u_i' Y) / s_i over the kept components
  let mut beta = zero;
  for &i in &kept {
    let uty = u.column(i).transpose() * y;
    let v_i = v_t.row(i).transpose();
    beta += (v_i * uty) / sigma[i];
  }

  Ok((beta, kept.len()))
}
