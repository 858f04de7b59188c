//! Values that can be staged as added.

use crate::local_file::LocalFile;
use crate::meta::EntryMeta;
use crate::s3_file::S3File;

/// A staged addition: local content to upload, or an object already in S3.
#[derive(Debug, Clone, PartialEq)]
pub enum AddedFile {
    /// Local content pending upload.
    Local(LocalFile),
    /// Reference to an existing S3 object.
    S3(S3File),
}

impl AddedFile {
    /// Size in bytes.
    pub fn size(&self) -> u64 {
        match self {
            Self::Local(file) => file.size(),
            Self::S3(file) => file.size,
        }
    }

    /// Entry metadata.
    pub fn meta(&self) -> Option<&EntryMeta> {
        match self {
            Self::Local(file) => file.meta(),
            Self::S3(file) => file.meta.as_ref(),
        }
    }

    /// Copy carrying different metadata.
    ///
    /// Local files are copied rather than modified, so the original handle
    /// held elsewhere keeps its metadata.
    pub fn with_meta(&self, meta: Option<EntryMeta>) -> Self {
        match self {
            Self::Local(file) => Self::Local(file.with_meta(meta)),
            Self::S3(file) => Self::S3(S3File {
                meta,
                ..file.clone()
            }),
        }
    }

    /// Whether this is a reference to an S3 object.
    pub fn is_s3(&self) -> bool {
        matches!(self, Self::S3(_))
    }

    /// Whether this is the empty-directory placeholder.
    pub fn is_empty_dir_marker(&self) -> bool {
        matches!(self, Self::S3(file) if file.is_empty_dir_marker())
    }

    /// The local file, if this is one.
    pub fn as_local(&self) -> Option<&LocalFile> {
        match self {
            Self::Local(file) => Some(file),
            Self::S3(_) => None,
        }
    }
}

impl From<LocalFile> for AddedFile {
    fn from(file: LocalFile) -> Self {
        Self::Local(file)
    }
}

impl From<S3File> for AddedFile {
    fn from(file: S3File) -> Self {
        Self::S3(file)
    }
}
