//! Content checksum of a package entry.

use package_staging_common::{hash_bytes, ChecksumType};
use serde::{Deserialize, Serialize};

/// Checksum as stored in package manifests: `{ "type": ..., "value": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    /// Algorithm that produced `value`.
    #[serde(rename = "type")]
    pub checksum_type: ChecksumType,
    /// Encoded digest (base64 for chunked, hex for legacy).
    pub value: String,
}

impl Checksum {
    /// Create a checksum from an already computed value.
    pub fn new(checksum_type: ChecksumType, value: impl Into<String>) -> Self {
        Self {
            checksum_type,
            value: value.into(),
        }
    }

    /// Checksum of in-memory content.
    pub fn of_bytes(data: &[u8], checksum_type: ChecksumType) -> Self {
        Self::new(checksum_type, hash_bytes(data, checksum_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_json_shape() {
        let checksum: Checksum = Checksum::new(ChecksumType::Sha256Chunked, "abc=");
        let json: serde_json::Value = serde_json::to_value(&checksum).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "sha2-256-chunked", "value": "abc=" })
        );
    }
}
