//! References to objects already stored in S3.

use package_staging_common::{
    handle_to_s3_url, S3Handle, EMPTY_DIR_MARKER_SENTINEL,
};
use serde::{Deserialize, Serialize};

use crate::meta::EntryMeta;

/// An object in a bucket staged by reference: no bytes are uploaded, the
/// package manifest just points at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3File {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Object version, if pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Object size in bytes.
    pub size: u64,
    /// Entry metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<EntryMeta>,
}

impl S3File {
    /// Create an unversioned reference without metadata.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, size: u64) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version: None,
            size,
            meta: None,
        }
    }

    /// Pin the reference to an object version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Zero-size placeholder that keeps an otherwise empty directory alive.
    pub fn empty_dir_marker() -> Self {
        Self::new(EMPTY_DIR_MARKER_SENTINEL, EMPTY_DIR_MARKER_SENTINEL, 0)
    }

    /// Whether this is the empty-directory placeholder.
    pub fn is_empty_dir_marker(&self) -> bool {
        self.bucket == EMPTY_DIR_MARKER_SENTINEL
            && self.key == EMPTY_DIR_MARKER_SENTINEL
            && self.size == 0
    }

    /// Bucket/key/version of the object.
    pub fn handle(&self) -> S3Handle {
        S3Handle {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            version: self.version.clone(),
        }
    }

    /// `s3://` URL used as the physical key of the resulting package entry.
    pub fn physical_key(&self) -> String {
        handle_to_s3_url(&self.handle())
    }
}
