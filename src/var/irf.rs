//! # Impulse responses
//!
//! $$
//! \Psi_0=I_K,\qquad \Psi_h=\sum_{j=1}^{\min(h,p)}A_j\Psi_{h-j},\qquad
//! \mathrm{IRF}_h=\Psi_h\,L e_s,\quad \Sigma_u=LL^\top
//! $$
//!

use nalgebra::DMatrix;
use nalgebra::DVector;

use super::model::ReducedFormVar;
use crate::error::VarError;
use crate::error::VarResult;

/// How the impulse vector was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShockIdentification {
  /// Column of the Cholesky factor of the residual covariance.
  Cholesky,
  /// Unit impulse; the covariance was missing or not positive definite, so
  /// the responses are not orthogonalized.
  UnitImpulse,
}

#[derive(Debug, Clone)]
pub struct ImpulseResponse {
  /// `horizon x K`; row `h` is the response of every variable `h` periods
  /// after the shock.
  pub responses: DMatrix<f64>,
  pub shock_index: usize,
  pub identification: ShockIdentification,
}

impl ImpulseResponse {
  pub fn horizon(&self) -> usize {
    self.responses.nrows()
  }

  pub fn is_orthogonalized(&self) -> bool {
    self.identification == ShockIdentification::Cholesky
  }

  /// Path of a single response variable over all horizons.
  pub fn response_of(&self, variable: usize) -> Vec<f64> {
    self.responses.column(variable).iter().copied().collect()
  }
}

/// Impulse vector for `shock_index`: Cholesky column when possible, unit
/// vector otherwise.
pub fn shock_vector(
  cov: Option<&DMatrix<f64>>,
  k: usize,
  shock_index: usize,
) -> (DVector<f64>, ShockIdentification) {
  if let Some(chol) = cov.and_then(|s| s.clone().cholesky()) {
    let l = chol.l();
    return (l.column(shock_index).into_owned(), ShockIdentification::Cholesky);
  }

  let mut e = DVector::zeros(k);
  e[shock_index] = 1.0;
  (e, ShockIdentification::UnitImpulse)
}

/// Moving-average coefficients `Psi_0 .. Psi_{horizon-1}`.
pub fn ma_coefficients(lag_coefficients: &[DMatrix<f64>], horizon: usize) -> Vec<DMatrix<f64>> {
  let k = lag_coefficients.first().map_or(0, |a| a.nrows());
  let p = lag_coefficients.len();

  let mut psi: Vec<DMatrix<f64>> = Vec::with_capacity(horizon);
  psi.push(DMatrix::identity(k, k));

  for h in 1..horizon {
    let mut m = DMatrix::zeros(k, k);
    for j in 1..=h.min(p) {
      m += &lag_coefficients[j - 1] * &psi[h - j];
    }
    psi.push(m);
  }

  psi.truncate(horizon);
  psi
}

pub fn impulse_response(
  model: &ReducedFormVar,
  horizon: usize,
  shock_index: usize,
) -> VarResult<ImpulseResponse> {
  model.ensure_fitted()?;
  if horizon == 0 {
    return Err(VarError::InvalidSpec("horizon must be > 0".into()));
  }
  if model.spec.lag_order == 0 {
    return Err(VarError::InvalidSpec("lags must be > 0 to IRF".into()));
  }

  let k = model.n_vars();
  if shock_index >= k {
    return Err(VarError::DimensionMismatch(format!("shock index must be < {k}, got {shock_index}")));
  }

  let (shock, identification) = shock_vector(model.residual_covariance.as_ref(), k, shock_index);
  if identification == ShockIdentification::UnitImpulse {
    tracing::warn!(
      shock_index,
      "residual covariance missing or not positive definite, using unit impulse"
    );
  }

  let psi = ma_coefficients(&model.lag_coefficients, horizon);
  let mut responses = DMatrix::zeros(horizon, k);
  for (h, psi_h) in psi.iter().enumerate() {
    let resp = psi_h * &shock;
    responses.row_mut(h).copy_from(&resp.transpose());
  }

  Ok(ImpulseResponse {
    responses,
    shock_index,
    identification,
  })
}
