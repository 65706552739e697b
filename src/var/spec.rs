use impl_new_derive::ImplNew;

use crate::error::VarError;
use crate::error::VarResult;

/// Deterministic regressors placed ahead of the lag blocks, in the order
/// `[constant, trend]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeterministicTerm {
  None,
  #[default]
  Constant,
  Trend,
  ConstantTrend,
}

impl DeterministicTerm {
  pub fn has_constant(self) -> bool {
    matches!(self, Self::Constant | Self::ConstantTrend)
  }

  pub fn has_trend(self) -> bool {
    matches!(self, Self::Trend | Self::ConstantTrend)
  }

  /// Number of deterministic design columns.
  pub fn columns(self) -> usize {
    self.has_constant() as usize + self.has_trend() as usize
  }

  /// Column of the trend coefficient inside the deterministic block.
  pub fn trend_column(self) -> Option<usize> {
    match self {
      Self::Trend => Some(0),
      Self::ConstantTrend => Some(1),
      Self::None | Self::Constant => None,
    }
  }

  /// Parse `none`, `const`, `trend`, `const-trend` (and common aliases).
  pub fn parse(s: &str) -> VarResult<Self> {
    match s.to_lowercase().as_str() {
      "none" | "n" | "nc" => Ok(Self::None),
      "const" | "constant" | "c" => Ok(Self::Constant),
      "trend" | "t" => Ok(Self::Trend),
      "const-trend" | "constant-trend" | "consttrend" | "ct" => Ok(Self::ConstantTrend),
      other => Err(VarError::InvalidSpec(format!(
        "unknown deterministic term {other:?}"
      ))),
    }
  }
}

/// What kind of VAR to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ImplNew)]
pub struct ModelSpec {
  /// Number of autoregressive lags p.
  pub lag_order: usize,
  pub deterministic: DeterministicTerm,
  /// Exogenous regressors are not supported; estimation rejects `true`.
  pub has_exogenous: bool,
}

impl ModelSpec {
  /// Endogenous-only specification.
  pub fn endogenous(lag_order: usize, deterministic: DeterministicTerm) -> Self {
    Self::new(lag_order, deterministic, false)
  }

  pub fn validate(&self) -> VarResult<()> {
    if self.lag_order == 0 {
      return Err(VarError::InvalidSpec("lags must be > 0".into()));
    }
    if self.has_exogenous {
      return Err(VarError::UnsupportedFeature(
        "exogenous variables not supported".into(),
      ));
    }
    Ok(())
  }

  /// Regressor count `d + p * K` of the full design.
  pub fn regressors(&self, n_vars: usize) -> usize {
    self.deterministic.columns() + self.lag_order * n_vars
  }
}

/// Numerical settings of the least-squares solve.
#[derive(Debug, Clone, Copy)]
pub struct EstimationConfig {
  /// Relative singular-value cutoff for the pseudoinverse fallback.
  pub rank_tolerance: f64,
  /// Largest accepted eigenvalue ratio of `X'X` before the normal equations
  /// are abandoned for the SVD solve.
  pub condition_limit: f64,
}

impl Default for EstimationConfig {
  fn default() -> Self {
    Self {
      rank_tolerance: 1e-12,
      condition_limit: 1e16,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::DeterministicTerm;
  use super::ModelSpec;
  use crate::error::ErrorKind;

  #[test]
  fn deterministic_columns() {
    assert_eq!(DeterministicTerm::None.columns(), 0);
    assert_eq!(DeterministicTerm::Constant.columns(), 1);
    assert_eq!(DeterministicTerm::Trend.columns(), 1);
    assert_eq!(DeterministicTerm::ConstantTrend.columns(), 2);
    assert_eq!(DeterministicTerm::Trend.trend_column(), Some(0));
    assert_eq!(DeterministicTerm::ConstantTrend.trend_column(), Some(1));
  }

  #[test]
  fn parses_aliases() {
    assert_eq!(DeterministicTerm::parse("CT").unwrap(), DeterministicTerm::ConstantTrend);
    assert_eq!(DeterministicTerm::parse("none").unwrap(), DeterministicTerm::None);
    assert!(DeterministicTerm::parse("seasonal").is_err());
  }

  #[test]
  fn validation_errors() {
    let zero = ModelSpec::endogenous(0, DeterministicTerm::Constant);
    assert_eq!(zero.validate().unwrap_err().kind(), ErrorKind::InvalidSpec);

    let exo = ModelSpec::new(2, DeterministicTerm::Constant, true);
    assert_eq!(exo.validate().unwrap_err().kind(), ErrorKind::UnsupportedFeature);

    let ok = ModelSpec::endogenous(2, DeterministicTerm::ConstantTrend);
    assert!(ok.validate().is_ok());
    assert_eq!(ok.regressors(3), 8);
  }
}
