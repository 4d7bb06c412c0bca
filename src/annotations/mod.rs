//! # Annotation Table
//!
//! Loads the delimited annotation file that describes each measurement and
//! looks rows up by file name.
//!
//! The table keeps every column as text, exactly as it appears in the file.
//! Only the `file_name` column is required; it is matched against measurement
//! file names with plain string equality. Keys are not assumed unique, so a
//! lookup returns every matching row.

use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

mod error;

pub use error::AnnotationError;

/// Name of the column that links annotation rows to measurement files
pub const FILE_NAME_COLUMN: &str = "file_name";

/// One annotation row, cells in header order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationRow {
    /// Cell values, aligned with [`AnnotationTable::headers`]
    pub cells: Vec<String>,
}

impl AnnotationRow {
    /// Cell value at `index`, if present
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

/// In-memory annotation table keyed by the `file_name` column
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationTable {
    headers: Vec<String>,
    key_index: usize,
    rows: Vec<AnnotationRow>,
}

impl AnnotationTable {
    /// Load a comma-delimited annotation file
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, AnnotationError> {
        Self::from_file(path, b',')
    }

    /// Load an annotation file with the given single-byte delimiter
    pub fn from_file<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, AnnotationError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AnnotationError::NotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        let table = Self::from_reader(BufReader::new(file), delimiter)?;
        debug!(
            "Loaded {} annotation rows ({} columns) from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse an annotation table from a reader
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, AnnotationError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();

        let key_index = headers
            .iter()
            .position(|h| h == FILE_NAME_COLUMN)
            .ok_or_else(|| AnnotationError::MissingColumn(FILE_NAME_COLUMN.to_string()))?;

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(AnnotationRow {
                cells: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(Self {
            headers,
            key_index,
            rows,
        })
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows whose `file_name` equals `file_name` exactly, in file order
    pub fn lookup(&self, file_name: &str) -> Vec<&AnnotationRow> {
        self.rows
            .iter()
            .filter(|row| row.get(self.key_index) == Some(file_name))
            .collect()
    }
}
