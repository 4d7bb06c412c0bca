/// Errors that can occur while loading a measurement file
#[derive(Debug, thiserror::Error)]
pub enum MeasurementError {
    /// I/O error reading the measurement file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// A field could not be parsed as a number
    #[error("Line {line}: could not convert '{value}' to a number")]
    InvalidNumber {
        /// 1-based line number in the file
        line: usize,
        /// Offending field text
        value: String,
    },

    /// A data row has a different number of columns than the first row
    #[error("Line {line}: expected {expected} columns, found {found}")]
    RaggedRow {
        /// 1-based line number in the file
        line: usize,
        /// Column count established by the first data row
        expected: usize,
        /// Column count on this line
        found: usize,
    },

    /// Rows are too narrow to hold time, pressure and derivative
    #[error("Expected at least {required} columns, found {found}")]
    TooFewColumns {
        /// Minimum column count
        required: usize,
        /// Column count in the file
        found: usize,
    },

    /// The file contains no data rows
    #[error("File contains no data rows")]
    Empty,
}
