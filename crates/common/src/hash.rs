//! Checksum algorithms for package entries.
//!
//! Two algorithms are supported:
//! - `sha2-256-chunked` - the content is split into parts (8 MiB, doubled while
//!   there would be more than 10 000 parts), each part is hashed with SHA-256 and
//!   the result is the base64 SHA-256 of the concatenated part digests.
//! - `SHA256` - legacy whole-content SHA-256 as a lowercase hex string.

use std::fmt;
use std::io::Read;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{CHECKSUM_CHUNK_SIZE, CHECKSUM_MAX_PARTS};

/// Checksum algorithm identifier as stored in package manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecksumType {
    /// Whole-content SHA-256, hex encoded.
    #[serde(rename = "SHA256")]
    Sha256,
    /// Chunked SHA-256, base64 encoded.
    #[serde(rename = "sha2-256-chunked")]
    Sha256Chunked,
}

impl ChecksumType {
    /// Manifest name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha256Chunked => "sha2-256-chunked",
        }
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part size used by the chunked algorithm for content of the given size.
///
/// # Arguments
/// * `file_size` - Total content size in bytes
///
/// # Returns
/// 8 MiB, doubled until the content fits into at most 10 000 parts.
pub fn checksum_chunk_size(file_size: u64) -> u64 {
    let mut chunk_size: u64 = CHECKSUM_CHUNK_SIZE;
    while file_size.div_ceil(chunk_size) > CHECKSUM_MAX_PARTS {
        chunk_size *= 2;
    }
    chunk_size
}

/// Streaming hasher for the `sha2-256-chunked` algorithm.
///
/// The part size depends on the total size, so it must be known up front.
pub struct ChunkedSha256Hasher {
    chunk_size: u64,
    part: Sha256,
    part_len: u64,
    part_digests: Vec<u8>,
}

impl ChunkedSha256Hasher {
    /// Create a hasher for content of `total_size` bytes.
    pub fn new(total_size: u64) -> Self {
        Self {
            chunk_size: checksum_chunk_size(total_size),
            part: Sha256::new(),
            part_len: 0,
            part_digests: Vec::new(),
        }
    }

    /// Feed more content into the hasher.
    ///
    /// # Arguments
    /// * `data` - Next bytes of the content
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let room: u64 = self.chunk_size - self.part_len;
            let take: usize = data.len().min(room as usize);
            self.part.update(&data[..take]);
            self.part_len += take as u64;
            data = &data[take..];

            if self.part_len == self.chunk_size {
                self.close_part();
            }
        }
    }

    /// Finalize and return the base64 checksum.
    ///
    /// Empty content has no parts, so its checksum is the SHA-256 of nothing.
    pub fn finish(mut self) -> String {
        if self.part_len > 0 {
            self.close_part();
        }
        BASE64.encode(Sha256::digest(&self.part_digests))
    }

    fn close_part(&mut self) {
        let part: Sha256 = std::mem::replace(&mut self.part, Sha256::new());
        self.part_digests.extend_from_slice(&part.finalize());
        self.part_len = 0;
    }
}

/// Compute a checksum over a byte slice.
///
/// # Arguments
/// * `data` - Bytes to hash
/// * `checksum_type` - Algorithm to use
pub fn hash_bytes(data: &[u8], checksum_type: ChecksumType) -> String {
    match checksum_type {
        ChecksumType::Sha256 => hex::encode(Sha256::digest(data)),
        ChecksumType::Sha256Chunked => {
            let mut hasher: ChunkedSha256Hasher = ChunkedSha256Hasher::new(data.len() as u64);
            hasher.update(data);
            hasher.finish()
        }
    }
}

/// Compute a checksum over a reader of known length.
///
/// # Arguments
/// * `reader` - Content source
/// * `size` - Content size in bytes (selects the chunk size)
/// * `checksum_type` - Algorithm to use
///
/// # Errors
/// Returns error if reading fails.
pub fn hash_reader<R: Read>(
    mut reader: R,
    size: u64,
    checksum_type: ChecksumType,
) -> Result<String, std::io::Error> {
    let mut buffer: Vec<u8> = vec![0u8; 64 * 1024];

    match checksum_type {
        ChecksumType::Sha256 => {
            let mut hasher: Sha256 = Sha256::new();
            loop {
                let bytes_read: usize = reader.read(&mut buffer)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
        ChecksumType::Sha256Chunked => {
            let mut hasher: ChunkedSha256Hasher = ChunkedSha256Hasher::new(size);
            loop {
                let bytes_read: usize = reader.read(&mut buffer)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
            }
            Ok(hasher.finish())
        }
    }
}

/// Compute a checksum over a file on disk.
///
/// # Arguments
/// * `path` - Path to the file to hash
/// * `checksum_type` - Algorithm to use
///
/// # Errors
/// Returns error if the file cannot be opened or read.
pub fn hash_file(path: &Path, checksum_type: ChecksumType) -> Result<String, std::io::Error> {
    let file: std::fs::File = std::fs::File::open(path)?;
    let size: u64 = file.metadata()?.len();
    hash_reader(file, size, checksum_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EMPTY_SHA256_HEX: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_legacy_empty() {
        assert_eq!(hash_bytes(b"", ChecksumType::Sha256), EMPTY_SHA256_HEX);
    }

    #[test]
    fn test_chunked_empty_is_sha256_of_nothing() {
        let expected: String = BASE64.encode(hex::decode(EMPTY_SHA256_HEX).unwrap());
        assert_eq!(hash_bytes(b"", ChecksumType::Sha256Chunked), expected);
    }

    #[test]
    fn test_chunked_single_part_is_hash_of_hash() {
        let part: Vec<u8> = Sha256::digest(b"hello world").to_vec();
        let expected: String = BASE64.encode(Sha256::digest(&part));
        assert_eq!(hash_bytes(b"hello world", ChecksumType::Sha256Chunked), expected);
    }

    #[test]
    fn test_chunked_streaming_matches_one_shot() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let mut hasher: ChunkedSha256Hasher = ChunkedSha256Hasher::new(data.len() as u64);
        for piece in data.chunks(4093) {
            hasher.update(piece);
        }
        assert_eq!(hasher.finish(), hash_bytes(&data, ChecksumType::Sha256Chunked));
    }

    #[test]
    fn test_chunk_size_grows_past_max_parts() {
        assert_eq!(checksum_chunk_size(0), CHECKSUM_CHUNK_SIZE);
        assert_eq!(
            checksum_chunk_size(CHECKSUM_CHUNK_SIZE * CHECKSUM_MAX_PARTS),
            CHECKSUM_CHUNK_SIZE
        );
        assert_eq!(
            checksum_chunk_size(CHECKSUM_CHUNK_SIZE * CHECKSUM_MAX_PARTS + 1),
            CHECKSUM_CHUNK_SIZE * 2
        );
    }

    #[test]
    fn test_hash_file_matches_bytes() {
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
        let file_path: std::path::PathBuf = dir.path().join("test.txt");

        let mut file: std::fs::File = std::fs::File::create(&file_path).unwrap();
        file.write_all(b"hello world").unwrap();
        drop(file);

        for checksum_type in [ChecksumType::Sha256, ChecksumType::Sha256Chunked] {
            let file_hash: String = hash_file(&file_path, checksum_type).unwrap();
            assert_eq!(file_hash, hash_bytes(b"hello world", checksum_type));
        }
    }

    #[test]
    fn test_hash_file_not_found() {
        let result: Result<String, std::io::Error> =
            hash_file(Path::new("/nonexistent/file.txt"), ChecksumType::Sha256);
        assert!(result.is_err());
    }

    #[test]
    fn test_checksum_type_serde_names() {
        let json: String = serde_json::to_string(&ChecksumType::Sha256Chunked).unwrap();
        assert_eq!(json, "\"sha2-256-chunked\"");
    }
}
