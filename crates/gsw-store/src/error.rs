//! Error types for the snapshot store
//!
//! Read and parse failures are recoverable (the caller substitutes an empty
//! snapshot); write failures are reported and the next cycle retries.

use std::path::PathBuf;

/// Snapshot store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Read {
        /// Snapshot file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// File exists but is not a snapshot in any known layout
    #[error("malformed snapshot in {path}: {source}")]
    Parse {
        /// Snapshot file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot could not be encoded
    #[error("failed to encode snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    /// IO error while writing the temporary file
    #[error("io error writing {path}: {source}")]
    Write {
        /// Temporary file or its directory
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Temporary file could not replace the target
    #[error("failed to replace {path}: {source}")]
    Persist {
        /// Target snapshot file
        path: PathBuf,
        /// Rename error
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Create read error for path
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create write error for path
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from reading an existing snapshot
    #[inline]
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Parse { .. })
    }
}
