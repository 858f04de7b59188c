//! Local file collection for package-staging.
//!
//! This crate turns local directory selections into stageable files:
//! - `LocalFileScanner` - directory walking into `LocalFile`s
//! - `ScanOptions` - symlink, empty-directory and hashing options
//! - `LocalSelection` - collected files, empty directories and hashing workers

pub mod error;
pub mod scanner;

// Re-export main types
pub use error::FileSystemError;
pub use scanner::{LocalFileScanner, LocalSelection, ScanOptions};
