use std::collections::BTreeMap;

use rayon::prelude::*;

use super::irf::ShockIdentification;
use super::model::ReducedFormExt;
use super::model::ReducedFormVar;
use crate::error::VarError;
use crate::error::VarResult;

/// Response paths of one variable to a shock in every variable.
#[derive(Debug, Clone)]
pub struct ShockAnalysis {
  pub response_index: usize,
  pub horizon: usize,
  /// Shock index -> response of `response_index` at horizons `0..horizon`.
  pub series: BTreeMap<usize, Vec<f64>>,
  /// `UnitImpulse` when any shock fell back to a non-orthogonalized impulse.
  pub identification: ShockIdentification,
}

impl ShockAnalysis {
  pub fn n_shocks(&self) -> usize {
    self.series.len()
  }

  pub fn is_orthogonalized(&self) -> bool {
    self.identification == ShockIdentification::Cholesky
  }
}

/// Runs the impulse response for every shock source against a fixed
/// response variable.
pub struct ShockAnalyzer<'a> {
  model: &'a ReducedFormVar,
}

impl<'a> ShockAnalyzer<'a> {
  pub fn new(model: &'a ReducedFormVar) -> Self {
    Self { model }
  }

  pub fn analyze(&self, response_index: usize, horizon: usize) -> VarResult<ShockAnalysis> {
    self.model.ensure_fitted()?;

    let k = self.model.n_vars();
    if response_index >= k {
      return Err(VarError::DimensionMismatch(format!("response index must be < {k}, got {response_index}")));
    }

    let paths = (0..k)
      .into_par_iter()
      .map(|shock| {
        let irf = self
          .model
          .impulse_response(horizon, shock)
          .map_err(|e| e.context(format!("IRF failed for shock {shock}")))?;
        Ok((shock, irf.response_of(response_index), irf.identification))
      })
      .collect::<VarResult<Vec<_>>>()?;

    let identification = if paths
      .iter()
      .all(|(_, _, id)| *id == ShockIdentification::Cholesky)
    {
      ShockIdentification::Cholesky
    } else {
      ShockIdentification::UnitImpulse
    };

    let series = paths.into_iter().map(|(s, path, _)| (s, path)).collect();
    tracing::debug!(response_index, horizon, shocks = k, "shock analysis complete");

    Ok(ShockAnalysis {
      response_index,
      horizon,
      series,
      identification,
    })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use nalgebra::DMatrix;

  use super::ShockAnalyzer;
  use crate::error::ErrorKind;
  use crate::var::irf::ShockIdentification;
  use crate::var::model::ReducedFormExt;
  use crate::var::model::ReducedFormVar;
  use crate::var::spec::DeterministicTerm;
  use crate::var::spec::ModelSpec;

  fn bivariate() -> ReducedFormVar {
    let spec = ModelSpec::endogenous(1, DeterministicTerm::Constant);
    let a1 = DMatrix::from_row_slice(2, 2, &[0.5, 0.2, 0.1, 0.3]);
    let sigma = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.3, 0.5]);
    ReducedFormVar::from_parts(spec, vec![a1], Some(DMatrix::zeros(2, 1)), Some(sigma)).unwrap()
  }

  #[test]
  fn collects_response_column_for_each_shock() {
    let model = bivariate();
    let analysis = ShockAnalyzer::new(&model).analyze(1, 5).unwrap();
    assert_eq!(analysis.n_shocks(), 2);
    assert!(analysis.is_orthogonalized());

    for shock in 0..2 {
      let irf = model.impulse_response(5, shock).unwrap();
      let path = &analysis.series[&shock];
      assert_eq!(path.len(), 5);
      for h in 0..5 {
        assert_abs_diff_eq!(path[h], irf.responses[(h, 1)], epsilon = 1e-15);
      }
    }
  }

  #[test]
  fn flags_unit_impulse_fallback() {
    let spec = ModelSpec::endogenous(1, DeterministicTerm::None);
    let model =
      ReducedFormVar::from_parts(spec, vec![DMatrix::from_element(2, 2, 0.1)], None, None).unwrap();
    let analysis = model.analyze_shocks(0, 3).unwrap();
    assert_eq!(analysis.identification, ShockIdentification::UnitImpulse);
    assert_eq!(analysis.series[&0][0], 1.0);
    assert_eq!(analysis.series[&1][0], 0.0);
  }

  #[test]
  fn rejects_out_of_range_response_and_zero_horizon() {
    let model = bivariate();
    let err = model.analyze_shocks(2, 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DimensionMismatch);

    let err = model.analyze_shocks(0, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSpec);
    assert!(err.to_string().contains("IRF failed for shock"));
  }
}
