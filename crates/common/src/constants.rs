//! Shared constants used across package-staging crates.

/// Maximum total size of local files uploaded with one package revision (20 GB).
pub const MAX_UPLOAD_SIZE: u64 = 20 * 1000 * 1000 * 1000;

/// Maximum total size of S3 references when chunked checksums are enabled (5 TB).
pub const MAX_S3_SIZE_CHUNKED: u64 = 5 * 1000 * 1000 * 1000 * 1000;

/// Maximum total size of S3 references with legacy checksums (50 GB).
/// Legacy checksums have to be computed over the whole object in one pass.
pub const MAX_S3_SIZE_LEGACY: u64 = 50 * 1000 * 1000 * 1000;

/// Maximum number of files staged in a single package revision.
pub const MAX_FILE_COUNT: usize = 1000;

/// Default part size for chunked checksums (8 MiB).
pub const CHECKSUM_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Maximum number of parts a chunked checksum may have (same limit as S3 multipart).
pub const CHECKSUM_MAX_PARTS: u64 = 10_000;

/// Bucket and key used by the empty-directory placeholder.
pub const EMPTY_DIR_MARKER_SENTINEL: &str = "[$empty$]";

/// File name of the empty-directory placeholder inside its directory.
pub const EMPTY_DIR_MARKER_PATH: &str = "[$.quiltkeep$]";

/// Logical key of the stub README added to otherwise empty packages.
pub const README_PATH: &str = "README.md";
