//! Hashing progress of staged local files.

use std::thread::JoinHandle;

use package_staging_common::ChecksumType;
use package_staging_model::{compute_hash, AddedFile, HashStatus};

use crate::error::StagingError;
use crate::state::FilesState;

/// Why staged files are not ready for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashingStatus {
    /// At least one hash is still being computed.
    InProgress,
    /// At least one hash failed.
    Error,
}

/// Check whether every staged local file has a hash.
///
/// A failure anywhere wins over pending hashes elsewhere.
///
/// # Returns
/// `None` when all hashes are computed.
pub fn validate_hashing_complete(state: &FilesState) -> Option<HashingStatus> {
    let mut pending: bool = false;

    for file in state.added.values().filter_map(AddedFile::as_local) {
        match file.hash().status() {
            HashStatus::Failed(_) => return Some(HashingStatus::Error),
            HashStatus::Pending => pending = true,
            HashStatus::Ready(_) => {}
        }
    }

    pending.then_some(HashingStatus::InProgress)
}

/// Turn an incomplete hashing status into the matching error.
///
/// # Errors
/// Returns `HashingFailed` naming the failed paths, or `HashingIncomplete`.
pub fn ensure_hashing_complete(state: &FilesState) -> Result<(), StagingError> {
    match validate_hashing_complete(state) {
        None => Ok(()),
        Some(HashingStatus::InProgress) => Err(StagingError::HashingIncomplete),
        Some(HashingStatus::Error) => Err(StagingError::HashingFailed {
            paths: state
                .added
                .iter()
                .filter(|(_, file)| {
                    file.as_local()
                        .map(|local| local.hash().error().is_some())
                        .unwrap_or(false)
                })
                .map(|(path, _)| path.clone())
                .collect(),
        }),
    }
}

/// Start background hashing for every staged local file that has not started.
///
/// # Arguments
/// * `state` - State whose local files to hash
/// * `checksum_type` - Algorithm to use
///
/// # Returns
/// Handles of the spawned workers; callers may join them or drop them.
pub fn start_hashing(state: &FilesState, checksum_type: ChecksumType) -> Vec<JoinHandle<()>> {
    state
        .added
        .values()
        .filter_map(AddedFile::as_local)
        .filter_map(|file| compute_hash(file, checksum_type))
        .collect()
}
