//! Path and S3 URL errors shared by the package-staging crates.

use thiserror::Error;

/// Errors from resolving local paths or parsing physical keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A collected file does not live under the selected directory.
    #[error("Path is outside root: {path} not in {root}")]
    PathOutsideRoot {
        /// Offending path.
        path: String,
        /// Selected directory.
        root: String,
    },

    /// Physical key is not an `s3://bucket/key` URL.
    #[error("Invalid S3 URL: {url}")]
    InvalidS3Url {
        /// The rejected URL.
        url: String,
    },

    /// The working directory could not be read while resolving a path.
    #[error("IO error at {path}: {message}")]
    IoError {
        /// Path being resolved.
        path: String,
        /// Underlying error text.
        message: String,
    },
}

impl PathError {
    /// Wrap an IO failure for `path`.
    ///
    /// The message is kept as text so the error stays `Clone`.
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
