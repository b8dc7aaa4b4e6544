use std::path::PathBuf;

/// Errors that can occur while decoding an in-memory wave buffer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Corrupt or unsupported header
    #[error("{0}")]
    Format(String),

    /// Fewer data bytes than the header declares
    #[error("header declares {declared} points, buffer holds {available}")]
    Truncated {
        /// Number of points the wave header declares
        declared: usize,
        /// Number of complete points actually present
        available: usize,
    },
}

impl DecodeError {
    pub(crate) fn format(detail: impl Into<String>) -> Self {
        DecodeError::Format(detail.into())
    }
}

/// Errors that can occur while reading instrument data from disk
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error with the file that caused it
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed header, bad checksum or unsupported layout
    #[error("Format error in {}: {detail}", path.display())]
    Format {
        /// File being read
        path: PathBuf,
        /// What was wrong
        detail: String,
    },

    /// The file ends before all declared samples are present
    #[error("Truncated data in {}: header declares {declared} points, file holds {available}", path.display())]
    Truncated {
        /// File being read
        path: PathBuf,
        /// Declared point count
        declared: usize,
        /// Complete points present
        available: usize,
    },

    /// A requested channel has no file in the shot folder
    #[error("Channel {channel} not found in {}", folder.display())]
    MissingChannel {
        /// Channel name
        channel: String,
        /// Shot folder searched
        folder: PathBuf,
    },

    /// Decoded samples violate the trace invariants
    #[error("Invalid trace {channel}: {source}")]
    InvalidTrace {
        /// Channel name
        channel: String,
        /// Violated invariant
        #[source]
        source: crate::shot::TraceError,
    },

    /// The same channel was supplied twice for one shot
    #[error("Duplicate channel {0} in shot")]
    DuplicateChannel(String),
}

impl ReaderError {
    pub(crate) fn from_decode(path: impl Into<PathBuf>, err: DecodeError) -> Self {
        let path = path.into();
        match err {
            DecodeError::Format(detail) => ReaderError::Format { path, detail },
            DecodeError::Truncated {
                declared,
                available,
            } => ReaderError::Truncated {
                path,
                declared,
                available,
            },
        }
    }
}
