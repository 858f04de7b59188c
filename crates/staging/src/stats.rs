//! Upload and reference totals used to gate package submission.

use package_staging_model::{AddedFile, HashStatus, LocalFile, PackageEntry};
use serde::Serialize;

use crate::config::StagingLimits;
use crate::state::FilesState;

/// File count and total size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Number of files.
    pub count: usize,
    /// Total size in bytes.
    pub size: u64,
}

impl Totals {
    fn add(&mut self, size: u64) {
        self.count += 1;
        self.size += size;
    }
}

/// Which limits were exceeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Warnings {
    /// Upload size above the limit.
    pub upload: bool,
    /// S3 reference size above the limit.
    pub s3: bool,
    /// File count above the limit.
    pub count: bool,
}

impl Warnings {
    fn any(&self) -> bool {
        self.upload || self.s3 || self.count
    }
}

/// Summary of what submitting the staged files would do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Local files that need uploading.
    pub upload: Totals,
    /// S3 objects referenced without upload.
    pub s3: Totals,
    /// Whether any local file is still being hashed.
    pub hashing: bool,
    /// Exceeded limits, `None` if all are respected.
    pub warn: Option<Warnings>,
}

/// Whether a local file's content differs from the baseline entry at its path.
///
/// Files without a computed hash count as changed.
fn needs_upload(file: &LocalFile, baseline: Option<&PackageEntry>) -> bool {
    match (file.hash().status(), baseline) {
        (HashStatus::Ready(value), Some(entry)) => value != entry.hash,
        _ => true,
    }
}

/// Compute upload and reference totals for a state.
///
/// # Arguments
/// * `state` - Staged files and baseline
/// * `limits` - Limits above which warnings are raised
/// * `delay_hashing` - Report `hashing: false` regardless of pending hashes
///
/// # Returns
/// Totals, hashing flag, and warnings.
pub fn calc_stats(state: &FilesState, limits: &StagingLimits, delay_hashing: bool) -> Stats {
    let mut stats: Stats = Stats::default();

    for (path, file) in &state.added {
        match file {
            AddedFile::S3(s3) if s3.is_empty_dir_marker() => {}
            AddedFile::S3(s3) => stats.s3.add(s3.size),
            AddedFile::Local(local) => {
                if !delay_hashing && !local.hash().is_ready() {
                    stats.hashing = true;
                }
                if needs_upload(local, state.existing.get(path)) {
                    stats.upload.add(local.size());
                }
            }
        }
    }

    let warnings: Warnings = Warnings {
        upload: stats.upload.size > limits.max_upload_size,
        s3: stats.s3.size > limits.max_s3_size,
        count: stats.upload.count + stats.s3.count > limits.max_file_count,
    };
    stats.warn = warnings.any().then_some(warnings);
    stats
}
