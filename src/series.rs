//! # Time series
//!
//! $$
//! Y=\begin{pmatrix}y_{0,1}&\cdots&y_{0,K}\\\vdots&&\vdots\\y_{T-1,1}&\cdots&y_{T-1,K}\end{pmatrix}
//! $$
//!
//! Immutable panel of observations: rows are chronological time steps,
//! columns are variables named by `variable_names`.

use std::collections::HashSet;

use nalgebra::DMatrix;

use crate::error::VarError;
use crate::error::VarResult;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
  observations: DMatrix<f64>,
  time_index: Vec<f64>,
  variable_names: Vec<String>,
}

impl TimeSeries {
  /// Build a series with an explicit time index.
  ///
  /// The index must be strictly increasing and match the row count, names
  /// must be unique and match the column count, and every observation must
  /// be finite.
  pub fn new(
    observations: DMatrix<f64>,
    time_index: Vec<f64>,
    variable_names: Vec<String>,
  ) -> VarResult<Self> {
    let (t, k) = observations.shape();

    if k == 0 {
      return Err(VarError::InvalidInput("series must have at least one variable".into()));
    }
    if time_index.len() != t {
      return Err(VarError::DimensionMismatch(format!(
        "time index has {} entries, observations have {t} rows",
        time_index.len()
      )));
    }
    if variable_names.len() != k {
      return Err(VarError::DimensionMismatch(format!(
        "{} variable names for {k} columns",
        variable_names.len()
      )));
    }

    let mut seen = HashSet::with_capacity(k);
    for name in &variable_names {
      if name.trim().is_empty() {
        return Err(VarError::InvalidInput("variable names must be non-empty".into()));
      }
      if !seen.insert(name.as_str()) {
        return Err(VarError::InvalidInput(format!("duplicate variable name {name:?}")));
      }
    }

    if let Some(w) = time_index.windows(2).find(|w| !(w[1] > w[0])) {
      return Err(VarError::InvalidInput(format!(
        "time index must be strictly increasing ({} then {})",
        w[0], w[1]
      )));
    }

    if let Some(pos) = observations.iter().position(|v| !v.is_finite()) {
      // column-major storage
      let (row, col) = (pos % t, pos / t);
      return Err(VarError::InvalidInput(format!(
        "non-finite observation at row {row}, column {col}"
      )));
    }

    Ok(Self {
      observations,
      time_index,
      variable_names,
    })
  }

  /// Build a series indexed `0, 1, ..., T-1`.
  pub fn from_observations(
    observations: DMatrix<f64>,
    variable_names: Vec<String>,
  ) -> VarResult<Self> {
    let time_index = (0..observations.nrows()).map(|t| t as f64).collect();
    Self::new(observations, time_index, variable_names)
  }

  /// Build a series from row-major rows, indexed `0, 1, ..., T-1`.
  pub fn from_rows(rows: &[Vec<f64>], variable_names: Vec<String>) -> VarResult<Self> {
    let k = variable_names.len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != k) {
      return Err(VarError::DimensionMismatch(format!(
        "row {i} has {} values, expected {k}",
        row.len()
      )));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Self::from_observations(DMatrix::from_row_slice(rows.len(), k, &flat), variable_names)
  }

  pub fn observations(&self) -> &DMatrix<f64> {
    &self.observations
  }

  pub fn time_index(&self) -> &[f64] {
    &self.time_index
  }

  pub fn variable_names(&self) -> &[String] {
    &self.variable_names
  }

  /// Number of time steps T.
  pub fn len(&self) -> usize {
    self.observations.nrows()
  }

  pub fn is_empty(&self) -> bool {
    self.observations.nrows() == 0
  }

  /// Number of variables K.
  pub fn n_vars(&self) -> usize {
    self.observations.ncols()
  }

  /// First differences `y_t - y_{t-1}`, keeping the later time stamps.
  pub fn difference(&self) -> VarResult<Self> {
    let t = self.len();
    if t < 2 {
      return Err(VarError::InsufficientData { required: 2, actual: t });
    }
    let y = &self.observations;
    let diffed = DMatrix::from_fn(t - 1, self.n_vars(), |r, k| y[(r + 1, k)] - y[(r, k)]);
    Self::new(diffed, self.time_index[1..].to_vec(), self.variable_names.clone())
  }

  /// Column index of a named variable.
  pub fn index_of(&self, name: &str) -> Option<usize> {
    self.variable_names.iter().position(|n| n == name)
  }
}

#[cfg(test)]
mod tests {
  use nalgebra::DMatrix;

  use super::TimeSeries;
  use crate::error::ErrorKind;

  fn names(n: &[&str]) -> Vec<String> {
    n.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn builds_default_index() {
    let ts = TimeSeries::from_rows(
      &[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
      names(&["cases", "temp"]),
    )
    .unwrap();
    assert_eq!(ts.len(), 3);
    assert_eq!(ts.n_vars(), 2);
    assert_eq!(ts.time_index(), &[0.0, 1.0, 2.0]);
    assert_eq!(ts.observations()[(2, 1)], 6.0);
    assert_eq!(ts.index_of("temp"), Some(1));
  }

  #[test]
  fn rejects_zero_variables() {
    let err = TimeSeries::from_observations(DMatrix::zeros(5, 0), vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
  }

  #[test]
  fn differencing_drops_first_period() {
    let ts = TimeSeries::new(
      DMatrix::from_row_slice(3, 2, &[1.0, 10.0, 4.0, 8.0, 9.0, 8.5]),
      vec![2.0, 3.0, 5.0],
      names(&["cases", "temp"]),
    )
    .unwrap();
    let d = ts.difference().unwrap();
    assert_eq!(d.observations(), &DMatrix::from_row_slice(2, 2, &[3.0, -2.0, 5.0, 0.5]));
    assert_eq!(d.time_index(), &[3.0, 5.0]);
    assert_eq!(d.variable_names(), ts.variable_names());

    let single = TimeSeries::from_rows(&[vec![1.0]], names(&["a"])).unwrap();
    assert_eq!(single.difference().unwrap_err().kind(), ErrorKind::InsufficientData);
  }

  #[test]
  fn rejects_duplicate_names() {
    let err = TimeSeries::from_observations(DMatrix::zeros(3, 2), names(&["a", "a"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
  }

  #[test]
  fn rejects_name_count_mismatch() {
    let err = TimeSeries::from_observations(DMatrix::zeros(3, 2), names(&["a"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
  }

  #[test]
  fn rejects_non_monotonic_index() {
    let err = TimeSeries::new(DMatrix::zeros(3, 1), vec![0.0, 2.0, 1.0], names(&["a"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
  }

  #[test]
  fn rejects_non_finite_values() {
    let mut y = DMatrix::zeros(3, 2);
    y[(1, 1)] = f64::NAN;
    let err = TimeSeries::from_observations(y, names(&["a", "b"])).unwrap_err();
    assert!(err.to_string().contains("row 1, column 1"));
  }
}
