//! CSV tables for forecasts, Granger results and shock analyses.
//!
//! Floats are written with six decimals.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use nalgebra::DMatrix;

use crate::error::VarError;
use crate::error::VarResult;
use crate::var::granger::GrangerMatrix;
use crate::var::shocks::ShockAnalysis;

const GRANGER_HEADER: [&str; 6] = ["CauseVar", "EffectVar", "FStatistic", "PValue", "Lags", "Significant"];

/// `variable_names` when it has one entry per column, otherwise
/// `Var1 .. VarK` for every column.
fn column_names(variable_names: &[String], k: usize) -> Vec<String> {
  if variable_names.len() == k {
    variable_names.to_vec()
  } else {
    (1..=k).map(|i| format!("Var{i}")).collect()
  }
}

/// One row per forecast step, one column per variable.
pub fn write_forecast<W: Write>(writer: W, forecast: &DMatrix<f64>, variable_names: &[String]) -> VarResult<()> {
  let header = column_names(variable_names, forecast.ncols());

  let mut wtr = Writer::from_writer(writer);
  wtr.write_record(&header)?;
  for row in forecast.row_iter() {
    wtr.write_record(row.iter().map(|v| format!("{v:.6}")))?;
  }
  wtr.flush()?;
  Ok(())
}

/// One row per ordered `(cause, effect)` pair.
pub fn write_granger<W: Write>(writer: W, results: &GrangerMatrix) -> VarResult<()> {
  let mut wtr = Writer::from_writer(writer);
  wtr.write_record(GRANGER_HEADER)?;
  for r in results.iter() {
    wtr.write_record([
      r.cause_variable.clone(),
      r.effect_variable.clone(),
      format!("{:.6}", r.f_statistic),
      format!("{:.6}", r.p_value),
      r.lags_used.to_string(),
      r.significant.to_string(),
    ])?;
  }
  wtr.flush()?;
  Ok(())
}

/// `Horizon, Shock_in_{name}...` with shock columns in variable order.
pub fn write_irf_analysis<W: Write>(
  writer: W,
  analysis: &ShockAnalysis,
  variable_names: &[String],
) -> VarResult<()> {
  let names = column_names(variable_names, analysis.n_shocks());
  let mut header = vec!["Horizon".to_string()];
  header.extend(names.iter().map(|name| format!("Shock_in_{name}")));

  let mut wtr = Writer::from_writer(writer);
  wtr.write_record(&header)?;
  for h in 0..analysis.horizon {
    let mut record = vec![h.to_string()];
    for path in analysis.series.values() {
      let v = path.get(h).copied().ok_or_else(|| {
        VarError::DimensionMismatch(format!("shock path shorter than horizon {}", analysis.horizon))
      })?;
      record.push(format!("{v:.6}"));
    }
    wtr.write_record(&record)?;
  }
  wtr.flush()?;
  Ok(())
}

pub fn write_forecast_to_path(
  path: impl AsRef<Path>,
  forecast: &DMatrix<f64>,
  variable_names: &[String],
) -> VarResult<()> {
  write_forecast(create(path.as_ref())?, forecast, variable_names)
}

pub fn write_granger_to_path(path: impl AsRef<Path>, results: &GrangerMatrix) -> VarResult<()> {
  write_granger(create(path.as_ref())?, results)
}

pub fn write_irf_analysis_to_path(
  path: impl AsRef<Path>,
  analysis: &ShockAnalysis,
  variable_names: &[String],
) -> VarResult<()> {
  write_irf_analysis(create(path.as_ref())?, analysis, variable_names)
}

/// Write `forecast.csv`, `granger.csv` and `irf_analysis.csv` into `dir`.
///
/// All three tables are rendered before any file is created, and files
/// already written are removed if a later one fails, so `dir` never holds a
/// partial result set.
pub fn write_analysis(
  dir: impl AsRef<Path>,
  forecast: &DMatrix<f64>,
  granger: &GrangerMatrix,
  shocks: &ShockAnalysis,
  variable_names: &[String],
) -> VarResult<()> {
  let dir = dir.as_ref();

  let mut forecast_csv = Vec::new();
  write_forecast(&mut forecast_csv, forecast, variable_names)?;
  let mut granger_csv = Vec::new();
  write_granger(&mut granger_csv, granger)?;
  let mut irf_csv = Vec::new();
  write_irf_analysis(&mut irf_csv, shocks, variable_names)?;

  let outputs = [
    (dir.join("forecast.csv"), forecast_csv),
    (dir.join("granger.csv"), granger_csv),
    (dir.join("irf_analysis.csv"), irf_csv),
  ];

  for (i, (path, bytes)) in outputs.iter().enumerate() {
    let written = create(path).and_then(|mut f| f.write_all(bytes).map_err(VarError::from));
    if let Err(e) = written {
      for (done, _) in &outputs[..=i] {
        // the failing file may not exist
        let _ = fs::remove_file(done);
      }
      return Err(e.context(format!("write {}", path.display())));
    }
  }

  tracing::info!(dir = %dir.display(), "analysis tables written");
  Ok(())
}

fn create(path: &Path) -> VarResult<File> {
  tracing::debug!(path = %path.display(), "writing CSV");
  File::create(path).map_err(|e| VarError::from(e).context(format!("create {}", path.display())))
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;
  use std::fs;

  use nalgebra::DMatrix;

  use super::*;
  use crate::series::TimeSeries;
  use crate::var::granger::GrangerCausalityTester;
  use crate::var::granger::GrangerConfig;
  use crate::var::irf::ShockIdentification;
  use crate::var::spec::DeterministicTerm;
  use crate::var::spec::ModelSpec;

  fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
  }

  fn written(f: impl FnOnce(&mut Vec<u8>) -> VarResult<()>) -> String {
    let mut buf = Vec::new();
    f(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
  }

  #[test]
  fn forecast_uses_names_or_fallback() {
    let fc = DMatrix::from_row_slice(2, 2, &[1.0, 2.5, 1.0 / 3.0, -4.0]);

    let out = written(|w| write_forecast(w, &fc, &names(&["ili", "temp"])));
    assert_eq!(out, "ili,temp\n1.000000,2.500000\n0.333333,-4.000000\n");

    let out = written(|w| write_forecast(w, &fc, &names(&["ili"])));
    assert!(out.starts_with("Var1,Var2\n"));
    assert_eq!(out.lines().count(), 3);
  }

  #[test]
  fn granger_rows_per_ordered_pair() {
    let rows: Vec<Vec<f64>> = (0..40)
      .map(|t| {
        let t = t as f64;
        vec![(t * 0.7).sin(), (t * 1.3).cos(), (t * 0.2).sin() + 0.1 * t]
      })
      .collect();
    let ts = TimeSeries::from_rows(&rows, names(&["a", "b", "c"])).unwrap();
    let tester =
      GrangerCausalityTester::new(ModelSpec::endogenous(1, DeterministicTerm::Constant), GrangerConfig::default());
    let matrix = tester.test_all_pairs(&ts).unwrap();

    let out = written(|w| write_granger(w, &matrix));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "CauseVar,EffectVar,FStatistic,PValue,Lags,Significant");
    assert_eq!(lines.len(), 1 + 6);
    assert!(lines[1].starts_with("a,b,"));
    let last = lines[1].rsplit(',').next().unwrap();
    assert!(last == "true" || last == "false");
  }

  #[test]
  fn irf_analysis_file() {
    let mut series = BTreeMap::new();
    series.insert(0, vec![1.0, 0.5, 0.25]);
    series.insert(1, vec![0.0, 0.2, 0.1]);
    let analysis = ShockAnalysis {
      response_index: 0,
      horizon: 3,
      series,
      identification: ShockIdentification::Cholesky,
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("irf_analysis.csv");
    write_irf_analysis_to_path(&path, &analysis, &names(&["ili"])).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Horizon,Shock_in_Var1,Shock_in_Var2");
    assert_eq!(lines[1], "0,1.000000,0.000000");
    assert_eq!(lines[3], "2,0.250000,0.100000");
    assert_eq!(lines.len(), 4);
  }

  #[test]
  fn unwritable_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("forecast.csv");
    let err = write_forecast_to_path(&path, &DMatrix::zeros(1, 1), &[]).unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::Io);
  }

  #[test]
  fn irf_header_uses_names_when_counts_match() {
    let mut series = BTreeMap::new();
    series.insert(0, vec![1.0]);
    series.insert(1, vec![0.0]);
    let analysis = ShockAnalysis {
      response_index: 1,
      horizon: 1,
      series,
      identification: ShockIdentification::Cholesky,
    };
    let out = written(|w| write_irf_analysis(w, &analysis, &names(&["ili", "temp"])));
    assert!(out.starts_with("Horizon,Shock_in_ili,Shock_in_temp\n"));
  }

  fn small_analysis() -> (DMatrix<f64>, GrangerMatrix, ShockAnalysis) {
    let rows: Vec<Vec<f64>> = (0..30)
      .map(|t| {
        let t = t as f64;
        vec![(t * 0.9).sin(), (t * 0.4).cos()]
      })
      .collect();
    let ts = TimeSeries::from_rows(&rows, names(&["a", "b"])).unwrap();
    let spec = ModelSpec::endogenous(1, DeterministicTerm::Constant);
    let granger = GrangerCausalityTester::new(spec, GrangerConfig::default())
      .test_all_pairs(&ts)
      .unwrap();

    let mut series = BTreeMap::new();
    series.insert(0, vec![1.0, 0.5]);
    series.insert(1, vec![0.0, 0.1]);
    let shocks = ShockAnalysis {
      response_index: 0,
      horizon: 2,
      series,
      identification: ShockIdentification::Cholesky,
    };
    (DMatrix::from_element(3, 2, 1.5), granger, shocks)
  }

  #[test]
  fn writes_all_three_tables() {
    let (forecast, granger, shocks) = small_analysis();
    let dir = tempfile::tempdir().unwrap();
    write_analysis(dir.path(), &forecast, &granger, &shocks, &names(&["a", "b"])).unwrap();

    for file in ["forecast.csv", "granger.csv", "irf_analysis.csv"] {
      assert!(dir.path().join(file).is_file(), "{file} missing");
    }
    let fc = fs::read_to_string(dir.path().join("forecast.csv")).unwrap();
    assert_eq!(fc.lines().count(), 4);
  }

  #[test]
  fn failed_table_leaves_no_partial_output() {
    let (forecast, granger, shocks) = small_analysis();
    let dir = tempfile::tempdir().unwrap();
    // a directory in the way of granger.csv
    fs::create_dir(dir.path().join("granger.csv")).unwrap();

    let err = write_analysis(dir.path(), &forecast, &granger, &shocks, &names(&["a", "b"])).unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    assert!(!dir.path().join("forecast.csv").exists());
    assert!(!dir.path().join("irf_analysis.csv").exists());
  }
}
