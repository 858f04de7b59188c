//! Runtime configuration for staging limits and hashing.
//!
//! The catalog ships a JSON runtime config; the keys used here are:
//!
//! ```json
//! {
//!   "chunkedChecksums": true,
//!   "packageRoot": ".quilt/packages/",
//!   "maxFileCount": 1000
//! }
//! ```
//!
//! Unknown keys are ignored. Size limits default to the catalog constants.

use std::path::Path;

use package_staging_common::{
    ChecksumType, MAX_FILE_COUNT, MAX_S3_SIZE_CHUNKED, MAX_S3_SIZE_LEGACY, MAX_UPLOAD_SIZE,
};
use serde::Deserialize;

use crate::error::StagingError;

/// Runtime configuration consumed by the staging crates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StagingConfig {
    /// Use `sha2-256-chunked` checksums (and the larger S3 reference limit).
    pub chunked_checksums: bool,
    /// Key prefix for uploaded package data.
    pub package_root: String,
    /// Override for the upload size limit, in bytes.
    pub max_upload_size: Option<u64>,
    /// Override for the S3 reference size limit, in bytes.
    pub max_s3_size: Option<u64>,
    /// Override for the file count limit.
    pub max_file_count: Option<usize>,
}

impl StagingConfig {
    /// Parse configuration from JSON text.
    ///
    /// # Errors
    /// Returns error if the text is not a valid config object.
    pub fn from_json_str(json: &str) -> Result<Self, StagingError> {
        serde_json::from_str(json).map_err(|e| StagingError::Config {
            message: e.to_string(),
        })
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, StagingError> {
        let text: String = std::fs::read_to_string(path).map_err(|e| StagingError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json_str(&text)
    }

    /// Checksum algorithm for newly added local files.
    pub fn checksum_type(&self) -> ChecksumType {
        if self.chunked_checksums {
            ChecksumType::Sha256Chunked
        } else {
            ChecksumType::Sha256
        }
    }

    /// Limits enforced by the submission warnings.
    pub fn limits(&self) -> StagingLimits {
        let defaults: StagingLimits = StagingLimits::for_chunked_checksums(self.chunked_checksums);
        StagingLimits {
            max_upload_size: self.max_upload_size.unwrap_or(defaults.max_upload_size),
            max_s3_size: self.max_s3_size.unwrap_or(defaults.max_s3_size),
            max_file_count: self.max_file_count.unwrap_or(defaults.max_file_count),
        }
    }
}

/// Size and count limits above which staging stats carry warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagingLimits {
    /// Total bytes of local files to upload.
    pub max_upload_size: u64,
    /// Total bytes of S3 references.
    pub max_s3_size: u64,
    /// Number of staged files.
    pub max_file_count: usize,
}

impl StagingLimits {
    /// Default limits for the given checksum mode.
    pub fn for_chunked_checksums(chunked_checksums: bool) -> Self {
        Self {
            max_upload_size: MAX_UPLOAD_SIZE,
            max_s3_size: if chunked_checksums {
                MAX_S3_SIZE_CHUNKED
            } else {
                MAX_S3_SIZE_LEGACY
            },
            max_file_count: MAX_FILE_COUNT,
        }
    }
}

impl Default for StagingLimits {
    fn default() -> Self {
        Self::for_chunked_checksums(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: StagingConfig = StagingConfig::default();
        assert_eq!(config.checksum_type(), ChecksumType::Sha256);
        assert_eq!(
            config.limits(),
            StagingLimits {
                max_upload_size: 20_000_000_000,
                max_s3_size: 50_000_000_000,
                max_file_count: 1000,
            }
        );
    }

    #[test]
    fn test_chunked_checksums_raise_s3_limit() {
        let config: StagingConfig =
            StagingConfig::from_json_str(r#"{ "chunkedChecksums": true, "other": 1 }"#).unwrap();
        assert_eq!(config.checksum_type(), ChecksumType::Sha256Chunked);
        assert_eq!(config.limits().max_s3_size, 5_000_000_000_000);
    }

    #[test]
    fn test_overrides() {
        let config: StagingConfig = StagingConfig::from_json_str(
            r#"{ "packageRoot": "root/", "maxFileCount": 5, "maxUploadSize": 10 }"#,
        )
        .unwrap();
        assert_eq!(config.package_root, "root/");
        assert_eq!(config.limits().max_file_count, 5);
        assert_eq!(config.limits().max_upload_size, 10);
    }

    #[test]
    fn test_from_file() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let path: std::path::PathBuf = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "chunkedChecksums": true }"#).unwrap();
        assert!(StagingConfig::from_file(&path).unwrap().chunked_checksums);
        assert!(matches!(
            StagingConfig::from_file(&dir.path().join("missing.json")),
            Err(StagingError::Config { .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            StagingConfig::from_json_str("[]"),
            Err(StagingError::Config { .. })
        ));
    }
}
