//! Error types for staging operations.

use package_staging_common::PathError;
use thiserror::Error;

/// Errors that can occur while staging files or planning a submission.
#[derive(Debug, Error)]
pub enum StagingError {
    /// A file move was requested for a path that is neither staged nor in the package.
    #[error("Failed to move file")]
    MoveFile {
        /// Virtual path of the missing source.
        path: String,
    },

    /// A directory move was requested for a prefix with no staged or packaged entries.
    #[error("Failed to move directory")]
    MoveDirectory {
        /// Virtual prefix of the missing source.
        path: String,
    },

    /// Local files are still being hashed.
    #[error("Files are still being hashed")]
    HashingIncomplete,

    /// At least one local file could not be hashed.
    #[error("Error hashing files: {}", .paths.join(", "))]
    HashingFailed {
        /// Paths of the files whose hash failed.
        paths: Vec<String>,
    },

    /// Submission with no files was refused.
    #[error("Package has no files")]
    EmptyPackage,

    /// Upload keys cannot be derived without a package name.
    #[error("Package name is required")]
    PackageNameRequired,

    /// A package entry's physical key could not be parsed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },
}
