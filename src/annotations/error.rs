/// Errors that can occur while loading the annotation table
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// The annotation file does not exist
    #[error("Annotation file not found: {0}")]
    NotFound(String),

    /// I/O error reading the annotation file
    #[error("Failed to read annotation file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Missing required column in the annotation header
    #[error("Missing required annotation column: {0}")]
    MissingColumn(String),
}
