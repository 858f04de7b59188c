//! Error types for local file collection.

use package_staging_common::PathError;
use thiserror::Error;

/// Errors that can occur while collecting local files.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// IO error while walking or reading a path.
    #[error("IO error at {path}: {source}")]
    IoError {
        /// Path where the error occurred.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The selection root is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// The rejected root.
        path: String,
    },

    /// Path could not be expressed relative to the selection.
    #[error(transparent)]
    Path(#[from] PathError),
}
