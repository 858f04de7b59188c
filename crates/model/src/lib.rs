//! Data model for staged package files.
//!
//! - `Checksum` - content hash of a package entry
//! - `S3File` - reference to an object already in a bucket
//! - `PackageEntry` - entry committed in an existing package revision
//! - `LocalFile` / `FileHash` - local content awaiting upload and its lazily computed hash
//! - `AddedFile` - anything that can be staged as added

mod added;
mod checksum;
mod local_file;
mod meta;
mod package_entry;
mod s3_file;

pub use added::AddedFile;
pub use checksum::Checksum;
pub use local_file::{
    compute_hash, compute_hash_blocking, FileHash, FileSource, HashStatus, LocalFile,
};
pub use meta::{user_meta, EntryMeta};
pub use package_entry::PackageEntry;
pub use s3_file::S3File;

pub use package_staging_common::ChecksumType;
