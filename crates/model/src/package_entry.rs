//! Entries of an existing package revision.

use package_staging_common::{parse_s3_url, PathError, S3Handle};
use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::meta::EntryMeta;
use crate::s3_file::S3File;

/// An entry committed in the package being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEntry {
    /// `s3://` URL of the object holding the entry's bytes.
    pub physical_key: String,
    /// Size in bytes.
    pub size: u64,
    /// Content checksum.
    pub hash: Checksum,
    /// Entry metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<EntryMeta>,
}

impl PackageEntry {
    /// Create an entry without metadata.
    pub fn new(physical_key: impl Into<String>, size: u64, hash: Checksum) -> Self {
        Self {
            physical_key: physical_key.into(),
            size,
            hash,
            meta: None,
        }
    }

    /// Re-stage this entry as a reference to its own physical object.
    ///
    /// # Errors
    /// Returns error if the physical key is not an `s3://` URL.
    pub fn to_s3_file(&self) -> Result<S3File, PathError> {
        let handle: S3Handle = parse_s3_url(&self.physical_key)?;
        Ok(S3File {
            bucket: handle.bucket,
            key: handle.key,
            version: handle.version,
            size: self.size,
            meta: self.meta.clone(),
        })
    }
}
