//! Collecting a local directory into stageable files.
//!
//! A collected directory behaves like a folder dropped into the package
//! dialog: every file's relative path starts with the directory's own name,
//! so staging the selection under a prefix recreates the folder there.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use package_staging_common::{
    ensure_slash, lexical_normalize, relative_posix_path, to_absolute, ChecksumType,
};
use package_staging_model::{compute_hash, LocalFile};
use walkdir::WalkDir;

use crate::error::FileSystemError;

/// Options for collecting a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Follow symlinks (false = skip them).
    pub follow_symlinks: bool,
    /// Report directories that contain no files.
    pub include_empty_dirs: bool,
    /// Start background hashing of every collected file with this algorithm.
    pub checksum_type: Option<ChecksumType>,
}

/// Files collected from a directory.
#[derive(Debug, Default)]
pub struct LocalSelection {
    /// Files in walk order (sorted by name within each directory).
    pub files: Vec<LocalFile>,
    /// Relative paths (with trailing slash) of directories without entries.
    pub empty_dirs: Vec<String>,
    /// Hashing workers started for `files`.
    pub hashing: Vec<JoinHandle<()>>,
}

impl LocalSelection {
    /// Total size of the collected files in bytes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(LocalFile::size).sum()
    }

    /// Block until every started hash is computed.
    pub fn wait_for_hashes(&mut self) {
        for handle in self.hashing.drain(..) {
            if handle.join().is_err() {
                log::error!("Hashing worker panicked");
            }
        }
    }
}

/// Collects local directories into `LocalFile`s.
#[derive(Debug, Clone, Default)]
pub struct LocalFileScanner {
    options: ScanOptions,
}

impl LocalFileScanner {
    /// Create a scanner.
    ///
    /// # Arguments
    /// * `options` - Collection options
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Collect every file under a directory.
    ///
    /// Relative paths are POSIX paths from the directory's parent, so
    /// collecting `/data/run1` yields `run1/a.csv`, `run1/sub/b.csv`, ...
    ///
    /// # Arguments
    /// * `root` - Directory to collect
    ///
    /// # Returns
    /// Collected files, empty directories and hashing workers.
    ///
    /// # Errors
    /// Returns error if the root is not a directory or an entry cannot be read.
    pub fn collect(&self, root: &Path) -> Result<LocalSelection, FileSystemError> {
        let root: PathBuf = lexical_normalize(&to_absolute(root)?);
        if !root.is_dir() {
            return Err(FileSystemError::NotADirectory {
                path: root.display().to_string(),
            });
        }
        let base: &Path = root.parent().unwrap_or(&root);

        let mut selection: LocalSelection = LocalSelection::default();

        let walker = WalkDir::new(&root)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry: walkdir::DirEntry = entry.map_err(|e| FileSystemError::IoError {
                path: e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                source: e.into(),
            })?;
            let path: &Path = entry.path();

            if entry.path_is_symlink() && !self.options.follow_symlinks {
                log::warn!("Skipping symlink {}", path.display());
                continue;
            }

            if entry.file_type().is_dir() {
                if self.options.include_empty_dirs && is_empty_dir(path)? {
                    selection
                        .empty_dirs
                        .push(ensure_slash(&relative_posix_path(path, base)?));
                }
                continue;
            }

            if !entry.file_type().is_file() && !entry.path_is_symlink() {
                log::warn!("Skipping special file {}", path.display());
                continue;
            }

            let size: u64 = entry
                .metadata()
                .map_err(|e| FileSystemError::IoError {
                    path: path.display().to_string(),
                    source: e.into(),
                })?
                .len();
            let relative_path: String = relative_posix_path(path, base)?;
            selection
                .files
                .push(LocalFile::from_disk_with_size(path, size, Some(relative_path)));
        }

        if let Some(checksum_type) = self.options.checksum_type {
            selection.hashing = selection
                .files
                .iter()
                .filter_map(|file| compute_hash(file, checksum_type))
                .collect();
        }

        log::debug!(
            "Collected {} files ({} bytes) from {}",
            selection.files.len(),
            selection.total_size(),
            root.display()
        );

        Ok(selection)
    }
}

fn is_empty_dir(path: &Path) -> Result<bool, FileSystemError> {
    let mut entries: std::fs::ReadDir =
        std::fs::read_dir(path).map_err(|source| FileSystemError::IoError {
            path: path.display().to_string(),
            source,
        })?;
    Ok(entries.next().is_none())
}
