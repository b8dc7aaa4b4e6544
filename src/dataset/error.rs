/// Errors raised when a dataset would violate its invariants
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    /// Grid value is NaN or infinite
    #[error("Time grid value at index {index} is not finite")]
    NonFiniteTime {
        /// Grid index
        index: usize,
    },

    /// Grid is not strictly increasing
    #[error("Time grid is not strictly increasing at index {index}")]
    NonIncreasingTime {
        /// Grid index
        index: usize,
    },

    /// Column length differs from the grid length
    #[error("Column {column} has {len} values, grid has {expected} points")]
    LengthMismatch {
        /// Column name
        column: String,
        /// Column length
        len: usize,
        /// Grid length
        expected: usize,
    },

    /// Two columns share a name
    #[error("Duplicate column {0}")]
    DuplicateColumn(String),
}

/// Errors that can occur while exporting a dataset
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// CSV error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON error while serializing footer metadata
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Temporary file could not be moved into place
    #[error("Failed to persist output file: {0}")]
    PersistError(#[from] tempfile::PersistError),

    /// Output path has an extension no exporter handles
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}
