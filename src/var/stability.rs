use nalgebra::DMatrix;
use nalgebra::Schur;

use super::model::ReducedFormVar;
use crate::error::VarError;
use crate::error::VarResult;

impl ReducedFormVar {
  /// `Kp x Kp` companion form `[A_1 .. A_p; I 0]`.
  pub fn companion_matrix(&self) -> VarResult<DMatrix<f64>> {
    self.ensure_fitted()?;
    let k = self.n_vars();
    let p = self.lag_coefficients.len();
    let n = k * p;

    let mut f = DMatrix::zeros(n, n);
    for (j, a) in self.lag_coefficients.iter().enumerate() {
      f.view_mut((0, j * k), (k, k)).copy_from(a);
    }
    for i in k..n {
      f[(i, i - k)] = 1.0;
    }
    Ok(f)
  }

  /// Largest eigenvalue modulus of the companion matrix.
  pub fn max_root_modulus(&self) -> VarResult<f64> {
    let f = self.companion_matrix()?;
    let schur = Schur::try_new(f, f64::EPSILON, 10_000)
      .ok_or_else(|| VarError::NumericalFailure("companion Schur decomposition did not converge".into()))?;
    Ok(
      schur
        .complex_eigenvalues()
        .iter()
        .map(|z| z.norm())
        .fold(0.0, f64::max),
    )
  }

  /// Stable (covariance-stationary) when every companion root lies strictly
  /// inside the unit circle.
  pub fn is_stable(&self) -> VarResult<bool> {
    Ok(self.max_root_modulus()? < 1.0)
  }
}
