//! Footer metadata keys and constants of exported files.

/// Version of the exported table layout
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Layout version
pub const KEY_FORMAT_VERSION: &str = "p3data:format_version";

/// Shot number
pub const KEY_SHOT: &str = "p3data:shot";

/// Acquisition time (RFC 3339)
pub const KEY_ACQUIRED_AT: &str = "p3data:acquired_at";

/// JSON array of column descriptions (units, source channel and file)
pub const KEY_CHANNELS: &str = "p3data:channels";

/// JSON array of applied processing steps
pub const KEY_PROCESSING_HISTORY: &str = "p3data:processing_history";

/// Producer name and version
pub const KEY_CONVERTER_INFO: &str = "p3data:converter_info";

/// Arrow field metadata key holding a column's units
pub const FIELD_UNITS: &str = "units";

/// Parquet file extension
pub const PARQUET_EXTENSION: &str = "parquet";

/// CSV file extension
pub const CSV_EXTENSION: &str = "csv";
