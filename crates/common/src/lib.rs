//! Shared types and utilities for package-staging.
//!
//! This crate provides common functionality used across all package-staging crates:
//! - Virtual path and S3 URL utilities
//! - Checksum algorithms (`sha2-256-chunked` and legacy `SHA256`)
//! - Size and count limits, placeholder constants
//! - Shared error types

pub mod constants;
pub mod error;
pub mod hash;
pub mod path_utils;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::PathError;
pub use hash::{checksum_chunk_size, hash_bytes, hash_file, hash_reader, ChecksumType, ChunkedSha256Hasher};
pub use path_utils::{
    basename, canonical_key, ensure_no_slash, ensure_slash, handle_to_s3_url, lexical_normalize,
    normalize_relative, parse_s3_url, posix_join, posix_normalize, relative_posix_path,
    to_absolute, to_posix_path, without_prefix, S3Handle,
};
