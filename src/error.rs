//! # Errors
//!
//! Typed failures for estimation, inference and table I/O. Every fallible
//! operation in the crate returns [`VarResult`]; numerical fallbacks that are
//! part of normal control flow (pseudoinverse solve, unit-impulse shocks,
//! degenerate F statistics) are not errors and never surface here.

use thiserror::Error;

/// Coarse error classification, stable across context wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  InvalidSpec,
  UnsupportedFeature,
  InsufficientData,
  ModelNotFit,
  DimensionMismatch,
  NumericalFailure,
  InsufficientDegreesOfFreedom,
  InvalidInput,
  Parse,
  Io,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VarError {
  /// Model specification or call arguments out of their valid range.
  #[error("invalid specification: {0}")]
  InvalidSpec(String),

  /// Requested a feature the estimator does not implement.
  #[error("unsupported feature: {0}")]
  UnsupportedFeature(String),

  /// Not enough observations for the requested lag order.
  #[error("insufficient data: need at least {required} observations, got {actual}")]
  InsufficientData { required: usize, actual: usize },

  /// Operation invoked on a model without fitted lag coefficients.
  #[error("VAR model not estimated")]
  ModelNotFit,

  #[error("dimension mismatch: {0}")]
  DimensionMismatch(String),

  /// A factorization could not be completed.
  #[error("numerical failure: {0}")]
  NumericalFailure(String),

  #[error("insufficient degrees of freedom: {dof}")]
  InsufficientDegreesOfFreedom { dof: i64 },

  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Header present but no data rows, or no header at all.
  #[error("empty input: {0}")]
  EmptyInput(String),

  /// Cell or row level parse failure. `row` and `column` are 1-based, the
  /// header being row 1.
  #[error("row {row}, column {column}: {message}")]
  Parse {
    row: u64,
    column: usize,
    message: String,
  },

  #[error(transparent)]
  Csv(#[from] csv::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error("{context}: {source}")]
  Context {
    context: String,
    #[source]
    source: Box<VarError>,
  },
}

pub type VarResult<T> = Result<T, VarError>;

impl VarError {
  /// Classification of the innermost error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      VarError::InvalidSpec(_) => ErrorKind::InvalidSpec,
      VarError::UnsupportedFeature(_) => ErrorKind::UnsupportedFeature,
      VarError::InsufficientData { .. } => ErrorKind::InsufficientData,
      VarError::ModelNotFit => ErrorKind::ModelNotFit,
      VarError::DimensionMismatch(_) => ErrorKind::DimensionMismatch,
      VarError::NumericalFailure(_) => ErrorKind::NumericalFailure,
      VarError::InsufficientDegreesOfFreedom { .. } => ErrorKind::InsufficientDegreesOfFreedom,
      VarError::InvalidInput(_) => ErrorKind::InvalidInput,
      VarError::EmptyInput(_) | VarError::Parse { .. } | VarError::Csv(_) => ErrorKind::Parse,
      VarError::Io(_) => ErrorKind::Io,
      VarError::Context { source, .. } => source.kind(),
    }
  }

  /// Wrap the error with a short description of the failing step.
  pub fn context(self, context: impl Into<String>) -> Self {
    VarError::Context {
      context: context.into(),
      source: Box::new(self),
    }
  }
}
