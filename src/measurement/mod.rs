//! # Measurement Loader
//!
//! Parses pressure-transient measurement files: plain text, one record per
//! line, whitespace-separated numeric columns, no header.
//!
//! ## Format
//!
//! ```text
//! # time      pressure    derivative
//! 0.001       12.41       3.02
//! 0.002       14.96       3.55
//! ```
//!
//! - Blank lines and `#` comments are ignored
//! - Every data row must have the same column count
//! - The first three columns are time, pressure and derivative; any further
//!   columns are kept in the [`NumericTable`] but not used for plotting
//!
//! Values are stored exactly as parsed: no sorting, scaling or filtering.

use std::fs;
use std::path::Path;

use log::debug;

mod error;

pub use error::MeasurementError;

/// Minimum column count of a measurement file
pub const REQUIRED_COLUMNS: usize = 3;

/// Column index of elapsed time
pub const TIME_COLUMN: usize = 0;
/// Column index of pressure
pub const PRESSURE_COLUMN: usize = 1;
/// Column index of the pressure derivative
pub const DERIVATIVE_COLUMN: usize = 2;

/// A rectangular table of `f64` values, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    columns: usize,
    values: Vec<f64>,
}

impl NumericTable {
    /// Parse whitespace-delimited numeric text.
    ///
    /// Fails on unparsable fields, ragged rows and input without data rows.
    pub fn parse(text: &str) -> Result<Self, MeasurementError> {
        let mut columns = 0usize;
        let mut values = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let mut count = 0usize;
            for field in line.split_whitespace() {
                let value = field
                    .parse::<f64>()
                    .map_err(|_| MeasurementError::InvalidNumber {
                        line: idx + 1,
                        value: field.to_string(),
                    })?;
                values.push(value);
                count += 1;
            }

            if count == 0 {
                continue;
            }
            if columns == 0 {
                columns = count;
            } else if count != columns {
                return Err(MeasurementError::RaggedRow {
                    line: idx + 1,
                    expected: columns,
                    found: count,
                });
            }
        }

        if columns == 0 {
            return Err(MeasurementError::Empty);
        }

        Ok(Self { columns, values })
    }

    /// Number of columns per row
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.values.len() / self.columns
    }

    /// One row as a slice
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.columns)?;
        self.values.get(start..start + self.columns)
    }

    /// Copy out a single column, top to bottom
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.columns {
            return None;
        }
        Some(
            self.values
                .chunks_exact(self.columns)
                .map(|row| row[index])
                .collect(),
        )
    }
}

/// Time, pressure and derivative sequences of one measurement.
///
/// All three vectors have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureSeries {
    /// Elapsed time
    pub time: Vec<f64>,
    /// Pressure change
    pub pressure: Vec<f64>,
    /// Pressure derivative
    pub derivative: Vec<f64>,
}

impl PressureSeries {
    /// Take the first three columns of `table`
    pub fn from_table(table: &NumericTable) -> Result<Self, MeasurementError> {
        let too_few = || MeasurementError::TooFewColumns {
            required: REQUIRED_COLUMNS,
            found: table.columns(),
        };
        Ok(Self {
            time: table.column(TIME_COLUMN).ok_or_else(too_few)?,
            pressure: table.column(PRESSURE_COLUMN).ok_or_else(too_few)?,
            derivative: table.column(DERIVATIVE_COLUMN).ok_or_else(too_few)?,
        })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series has no records
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Read and parse a measurement file into a [`NumericTable`]
pub fn load_table(path: &Path) -> Result<NumericTable, MeasurementError> {
    let text = fs::read_to_string(path)?;
    NumericTable::parse(&text)
}

/// Read a measurement file and extract its pressure series
pub fn load_series(path: &Path) -> Result<PressureSeries, MeasurementError> {
    let table = load_table(path)?;
    let series = PressureSeries::from_table(&table)?;
    debug!(
        "Loaded {} records ({} columns) from {}",
        series.len(),
        table.columns(),
        path.display()
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let table = NumericTable::parse("0.1 10 1\n0.2 11 2\n0.3 12.5 3\n").unwrap();
        assert_eq!(table.columns(), 3);
        assert_eq!(table.rows(), 3);
        assert_eq!(table.row(1), Some(&[0.2, 11.0, 2.0][..]));
        assert_eq!(table.column(1), Some(vec![10.0, 11.0, 12.5]));
        assert_eq!(table.column(3), None);
    }

    #[test]
    fn test_parse_tabs_comments_and_blank_lines() {
        let text = "# header\n\n1e-3\t5\t0.5  # first\n   \n2e-3  6\t0.7\n";
        let table = NumericTable::parse(text).unwrap();
        assert_eq!(table.rows(), 2);
        assert_eq!(table.column(0), Some(vec![1e-3, 2e-3]));
    }

    #[test]
    fn test_extra_columns_ignored_by_series() {
        let table = NumericTable::parse("1 2 3 4 5\n6 7 8 9 10\n").unwrap();
        let series = PressureSeries::from_table(&table).unwrap();
        assert_eq!(series.time, vec![1.0, 6.0]);
        assert_eq!(series.pressure, vec![2.0, 7.0]);
        assert_eq!(series.derivative, vec![3.0, 8.0]);
    }

    #[test]
    fn test_no_reordering() {
        let table = NumericTable::parse("3 1 1\n1 2 2\n2 3 3\n").unwrap();
        let series = PressureSeries::from_table(&table).unwrap();
        assert_eq!(series.time, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_too_few_columns() {
        let table = NumericTable::parse("1 2\n3 4\n").unwrap();
        let err = PressureSeries::from_table(&table).unwrap_err();
        assert!(matches!(
            err,
            MeasurementError::TooFewColumns { required: 3, found: 2 }
        ));
    }

    #[test]
    fn test_invalid_number() {
        let err = NumericTable::parse("1 2 3\n4 five 6\n").unwrap_err();
        match err {
            MeasurementError::InvalidNumber { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "five");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ragged_row() {
        let err = NumericTable::parse("1 2 3\n4 5\n").unwrap_err();
        assert!(matches!(
            err,
            MeasurementError::RaggedRow { line: 2, expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            NumericTable::parse("").unwrap_err(),
            MeasurementError::Empty
        ));
        assert!(matches!(
            NumericTable::parse("# only a comment\n\n").unwrap_err(),
            MeasurementError::Empty
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_series(Path::new("/no/such/measurement.txt")).unwrap_err();
        assert!(matches!(err, MeasurementError::IoError(_)));
    }
}
