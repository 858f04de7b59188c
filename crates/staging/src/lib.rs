//! File staging for data package creation.
//!
//! A package being created or edited is described by a [`FilesState`]: files
//! staged as added, paths marked as deleted, and the baseline entries of the
//! package revision being edited. The state only changes through
//! [`handle_files_action`], which never modifies its inputs.
//!
//! # Submission
//!
//! - [`calc_stats`] - upload and reference totals with limit warnings
//! - [`validate_hashing_complete`] - whether every local file has a hash
//! - [`group_added_files`] - local uploads vs. S3 references
//! - [`plan_submission`] - upload keys and the manifest assembly step
//!
//! # Display
//!
//! [`compute_entries`] projects a state into a directory tree whose nodes are
//! also what `Move` actions refer to.

mod action;
mod config;
mod entry;
mod error;
mod grouping;
mod hashing;
mod import;
mod keys;
mod state;
mod stats;
mod submission;

pub use action::{handle_files_action, EntryAt, FilesAction, FilesReducer};
pub use config::{StagingConfig, StagingLimits};
pub use entry::{compute_entries, FilesEntry, FilesEntryState, FilesEntryType};
pub use error::StagingError;
pub use grouping::{group_added_files, AddedFilesGroups, LocalEntry, S3Entry};
pub use hashing::{ensure_hashing_complete, start_hashing, validate_hashing_complete, HashingStatus};
pub use import::s3_selection_to_files;
pub use keys::{move_existing_directory_to_added, move_existing_to_added, rename_key, rename_keys};
pub use state::{AddedMap, DeletedSet, ExistingMap, FilesState};
pub use stats::{calc_stats, Stats, Totals, Warnings};
pub use submission::{
    create_readme_file, files_state_to_entries, plan_submission, ManifestEntry, SubmissionPlan,
    UploadItem, ValidationEntry, WhenNoFiles,
};
