use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use csv::StringRecord;
use csv::Trim;

use crate::error::VarError;
use crate::error::VarResult;
use crate::series::TimeSeries;

/// Read a header row of variable names followed by numeric rows.
///
/// There is no time column; the series is indexed `0, 1, ..., T-1`.
/// Completely empty lines are skipped and cells are trimmed before parsing.
pub fn read_time_series<R: Read>(reader: R) -> VarResult<TimeSeries> {
  let mut rdr = ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .trim(Trim::All)
    .from_reader(reader);

  let mut records = rdr.records();
  let header = loop {
    match records.next() {
      Some(record) => {
        let record = record?;
        if !is_blank(&record) {
          break record;
        }
      }
      None => return Err(VarError::EmptyInput("missing header row".into())),
    }
  };

  let names: Vec<String> = header.iter().map(str::to_owned).collect();
  let k = names.len();
  let mut rows = Vec::new();

  for (i, record) in records.enumerate() {
    let record = record?;
    if is_blank(&record) {
      continue;
    }
    // position is 1-based; fall back to counting from the header
    let row = record.position().map_or(i as u64 + 2, |p| p.line());

    if record.len() != k {
      return Err(VarError::Parse {
        row,
        column: record.len().min(k) + 1,
        message: format!("expected {k} columns, got {}", record.len()),
      });
    }

    let values = record
      .iter()
      .enumerate()
      .map(|(j, cell)| {
        cell.parse::<f64>().map_err(|e| VarError::Parse {
          row,
          column: j + 1,
          message: format!("cannot parse {cell:?} as a number: {e}"),
        })
      })
      .collect::<VarResult<Vec<_>>>()?;
    rows.push(values);
  }

  if rows.is_empty() {
    return Err(VarError::EmptyInput("no data rows".into()));
  }

  tracing::debug!(rows = rows.len(), vars = k, "loaded CSV panel");
  TimeSeries::from_rows(&rows, names)
}

/// [`read_time_series`] on a file.
pub fn load_csv(path: impl AsRef<Path>) -> VarResult<TimeSeries> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|e| VarError::from(e).context(format!("open {}", path.display())))?;
  read_time_series(file).map_err(|e| e.context(format!("load {}", path.display())))
}

fn is_blank(record: &StringRecord) -> bool {
  record.iter().all(str::is_empty)
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;
  use std::io::Write;

  use super::load_csv;
  use super::read_time_series;
  use crate::error::ErrorKind;
  use crate::error::VarError;

  fn read(text: &str) -> crate::error::VarResult<crate::series::TimeSeries> {
    read_time_series(Cursor::new(text.as_bytes()))
  }

  #[test]
  fn reads_header_and_rows() {
    let ts = read("ili, temp\n1.5, 20\n2.0,21.5\n\n3,19\n").unwrap();
    assert_eq!(ts.variable_names(), &["ili".to_string(), "temp".to_string()]);
    assert_eq!(ts.len(), 3);
    assert_eq!(ts.observations()[(2, 0)], 3.0);
    assert_eq!(ts.observations()[(1, 1)], 21.5);
    assert_eq!(ts.time_index(), &[0.0, 1.0, 2.0]);
  }

  #[test]
  fn bad_cell_reports_file_position() {
    let err = read("a,b\n1,2\n3,x\n").unwrap_err();
    match err {
      VarError::Parse { row, column, .. } => {
        assert_eq!(row, 3);
        assert_eq!(column, 2);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn ragged_row_is_rejected() {
    let err = read("a,b,c\n1,2,3\n4,5\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().starts_with("row 3, column 3"));
    assert!(err.to_string().contains("expected 3 columns, got 2"));
  }

  #[test]
  fn empty_inputs() {
    assert!(matches!(read("").unwrap_err(), VarError::EmptyInput(_)));
    assert!(matches!(read("a,b\n").unwrap_err(), VarError::EmptyInput(_)));
  }

  #[test]
  fn duplicate_names_are_invalid() {
    let err = read("a,a\n1,2\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
  }

  #[test]
  fn loads_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "x\n0.5\n0.25\n").unwrap();
    let ts = load_csv(file.path()).unwrap();
    assert_eq!(ts.len(), 2);

    let err = load_csv(file.path().with_extension("missing")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
  }
}
