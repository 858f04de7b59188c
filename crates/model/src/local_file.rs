//! Local files awaiting upload and their background-computed hashes.
//!
//! A `LocalFile` is cheap to clone. Clones (including the metadata-bearing
//! copies made by `with_meta`) share one `FileHash`, so a hash that finishes
//! after a copy was made is visible through every copy.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::JoinHandle;

use package_staging_common::{hash_reader, ChecksumType};

use crate::checksum::Checksum;
use crate::meta::EntryMeta;

/// Outcome of hashing a local file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HashStatus {
    /// Not finished (or not started).
    #[default]
    Pending,
    /// Hash computed.
    Ready(Checksum),
    /// Hashing failed with the given message.
    Failed(String),
}

#[derive(Debug, Default)]
struct HashSlot {
    started: bool,
    status: HashStatus,
}

/// Shared, lazily filled content hash of a local file.
#[derive(Debug, Clone, Default)]
pub struct FileHash {
    slot: Arc<RwLock<HashSlot>>,
}

impl FileHash {
    /// A hash that has not been computed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A hash that is already known.
    pub fn ready(value: Checksum) -> Self {
        Self::settled(HashStatus::Ready(value))
    }

    /// A hash whose computation already failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::settled(HashStatus::Failed(message.into()))
    }

    fn settled(status: HashStatus) -> Self {
        Self {
            slot: Arc::new(RwLock::new(HashSlot {
                started: true,
                status,
            })),
        }
    }

    /// Current status snapshot.
    pub fn status(&self) -> HashStatus {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
            .clone()
    }

    /// Whether hashing has settled, successfully or not.
    pub fn is_ready(&self) -> bool {
        !matches!(self.status(), HashStatus::Pending)
    }

    /// Computed checksum, if hashing succeeded.
    pub fn value(&self) -> Option<Checksum> {
        match self.status() {
            HashStatus::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Failure message, if hashing failed.
    pub fn error(&self) -> Option<String> {
        match self.status() {
            HashStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether both handles point at the same underlying hash.
    pub fn same_handle(&self, other: &FileHash) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    /// Claim the computation. Returns `false` if it was already claimed.
    fn try_start(&self) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.started {
            return false;
        }
        slot.started = true;
        true
    }

    fn resolve(&self, status: HashStatus) {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .status = status;
    }
}

/// Where a local file's bytes live.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A file on disk.
    Disk(PathBuf),
    /// Content held in memory (generated files such as a stub README).
    Memory(Arc<[u8]>),
}

impl PartialEq for FileSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Disk(a), Self::Disk(b)) => a == b,
            (Self::Memory(a), Self::Memory(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A local file selected for upload.
#[derive(Debug, Clone)]
pub struct LocalFile {
    name: String,
    relative_path: Option<String>,
    size: u64,
    source: FileSource,
    hash: FileHash,
    meta: Option<EntryMeta>,
}

impl LocalFile {
    /// Reference a file on disk.
    ///
    /// # Arguments
    /// * `path` - Location of the file
    /// * `relative_path` - Path inside the dropped selection, if any
    ///
    /// # Errors
    /// Returns error if the file's metadata cannot be read.
    pub fn from_disk(path: &Path, relative_path: Option<String>) -> Result<Self, std::io::Error> {
        let size: u64 = std::fs::metadata(path)?.len();
        Ok(Self::from_disk_with_size(path, size, relative_path))
    }

    /// Reference a file on disk whose size was already read (e.g. during a walk).
    ///
    /// # Arguments
    /// * `path` - Location of the file
    /// * `size` - Size in bytes
    /// * `relative_path` - Path inside the dropped selection, if any
    pub fn from_disk_with_size(path: &Path, size: u64, relative_path: Option<String>) -> Self {
        let name: String = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            relative_path,
            size,
            source: FileSource::Disk(path.to_path_buf()),
            hash: FileHash::new(),
            meta: None,
        }
    }

    /// Wrap in-memory content as a file.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let data: Arc<[u8]> = data.into();
        Self {
            name: name.into(),
            relative_path: None,
            size: data.len() as u64,
            source: FileSource::Memory(data),
            hash: FileHash::new(),
            meta: None,
        }
    }

    /// Replace the hash handle (for files whose hash is known up front).
    pub fn with_hash(mut self, hash: FileHash) -> Self {
        self.hash = hash;
        self
    }

    /// Set the path inside the dropped selection.
    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    /// Copy carrying different metadata. Content and hash handle are shared.
    pub fn with_meta(&self, meta: Option<EntryMeta>) -> Self {
        Self {
            meta,
            ..self.clone()
        }
    }

    /// File name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path inside the dropped selection, if any.
    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Content location.
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Content hash handle.
    pub fn hash(&self) -> &FileHash {
        &self.hash
    }

    /// Entry metadata.
    pub fn meta(&self) -> Option<&EntryMeta> {
        self.meta.as_ref()
    }

    /// Open the content for reading.
    ///
    /// # Errors
    /// Returns error if a disk file cannot be opened.
    pub fn open(&self) -> Result<Box<dyn Read + Send>, std::io::Error> {
        match &self.source {
            FileSource::Disk(path) => Ok(Box::new(std::fs::File::open(path)?)),
            FileSource::Memory(data) => Ok(Box::new(Cursor::new(Arc::clone(data)))),
        }
    }
}

impl PartialEq for LocalFile {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.relative_path == other.relative_path
            && self.size == other.size
            && self.source == other.source
            && self.hash.same_handle(&other.hash)
            && self.meta == other.meta
    }
}

/// Hash a local file on the calling thread.
///
/// Does nothing and returns `None` if the file's hash was already claimed by
/// another computation. Failures are logged and recorded in the hash.
///
/// # Arguments
/// * `file` - File to hash
/// * `checksum_type` - Algorithm to use
///
/// # Returns
/// The checksum if this call computed it successfully.
pub fn compute_hash_blocking(file: &LocalFile, checksum_type: ChecksumType) -> Option<Checksum> {
    if !file.hash.try_start() {
        return None;
    }
    run_hash(file, checksum_type)
}

/// Start hashing a local file on a background thread.
///
/// The computation is started at most once per hash handle; if it was already
/// claimed, `None` is returned and nothing is spawned. There is no
/// cancellation: the thread runs to completion even if the file is unstaged.
///
/// # Arguments
/// * `file` - File to hash
/// * `checksum_type` - Algorithm to use
pub fn compute_hash(file: &LocalFile, checksum_type: ChecksumType) -> Option<JoinHandle<()>> {
    if !file.hash.try_start() {
        return None;
    }

    let worker_file: LocalFile = file.clone();
    let spawned: Result<JoinHandle<()>, std::io::Error> = std::thread::Builder::new()
        .name(format!("hash-{}", file.name))
        .spawn(move || {
            run_hash(&worker_file, checksum_type);
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("Error hashing file \"{}\": {}", file.name, e);
            file.hash.resolve(HashStatus::Failed(e.to_string()));
            None
        }
    }
}

fn run_hash(file: &LocalFile, checksum_type: ChecksumType) -> Option<Checksum> {
    let result: Result<String, std::io::Error> = file
        .open()
        .and_then(|reader| hash_reader(reader, file.size, checksum_type));

    match result {
        Ok(value) => {
            let checksum: Checksum = Checksum::new(checksum_type, value);
            log::debug!("Hashed \"{}\": {}", file.name, checksum.value);
            file.hash.resolve(HashStatus::Ready(checksum.clone()));
            Some(checksum)
        }
        Err(e) => {
            log::error!("Error hashing file \"{}\": {}", file.name, e);
            file.hash.resolve(HashStatus::Failed(e.to_string()));
            None
        }
    }
}
