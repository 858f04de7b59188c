//! Planning the upload and manifest for a staged package.
//!
//! Submission happens in two steps around an external uploader:
//!
//! 1. [`plan_submission`] checks the state is ready and lists the local files
//!    to upload together with the keys to upload them under.
//! 2. Once the uploader reports the resulting entries,
//!    [`SubmissionPlan::assemble`] merges them with the retained baseline and
//!    the staged S3 references into the manifest entry list.

use std::collections::BTreeMap;

use package_staging_common::{canonical_key, README_PATH};
use package_staging_model::{
    compute_hash_blocking, user_meta, Checksum, EntryMeta, LocalFile, PackageEntry,
};
use serde::Serialize;

use crate::config::StagingConfig;
use crate::error::StagingError;
use crate::grouping::{group_added_files, AddedFilesGroups, LocalEntry};
use crate::hashing::ensure_hashing_complete;
use crate::state::FilesState;

/// Entry summary checked against the bucket's metadata schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationEntry {
    /// Path inside the package.
    pub logical_key: String,
    /// The entry's `user_meta` object.
    pub meta: EntryMeta,
    /// Size in bytes.
    pub size: u64,
}

/// What a submission should do when the package would have no files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WhenNoFiles {
    /// Refuse with `EmptyPackage`.
    #[default]
    Reject,
    /// Create the empty package.
    Allow,
    /// Add a generated `README.md`.
    AddReadme,
}

/// A local file to upload and the key to upload it under.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadItem {
    /// Path inside the package.
    pub path: String,
    /// Content to upload.
    pub file: LocalFile,
    /// Destination key in the package bucket.
    pub key: String,
    /// Metadata for the resulting entry.
    pub meta: Option<EntryMeta>,
}

/// Entry of the manifest sent to the package-construct call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Path inside the package.
    pub logical_key: String,
    /// `s3://` URL of the entry's bytes.
    pub physical_key: String,
    /// Checksum, if known; the backend computes missing ones.
    pub hash: Option<Checksum>,
    /// Entry metadata.
    pub meta: Option<EntryMeta>,
    /// Size, if known.
    pub size: Option<u64>,
}

impl ManifestEntry {
    fn from_package_entry(logical_key: &str, entry: &PackageEntry) -> Self {
        Self {
            logical_key: logical_key.to_string(),
            physical_key: entry.physical_key.clone(),
            hash: Some(entry.hash.clone()),
            meta: entry.meta.clone(),
            size: Some(entry.size),
        }
    }
}

/// Everything needed to upload and assemble a package.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPlan {
    /// Local files whose content is not already in the package.
    pub to_upload: Vec<UploadItem>,
    /// Staged S3 references, keyed by path.
    pub remote: BTreeMap<String, ManifestEntry>,
    /// Baseline entries that were not deleted, keyed by path.
    pub retained: BTreeMap<String, PackageEntry>,
    /// Entries for metadata validation.
    pub entries: Vec<ValidationEntry>,
}

impl SubmissionPlan {
    /// Build the manifest entry list from the uploader's results.
    ///
    /// Uploaded entries replace retained ones at the same path, and staged S3
    /// references replace both.
    ///
    /// # Arguments
    /// * `uploaded` - Entries produced by uploading `to_upload`, keyed by path
    ///
    /// # Returns
    /// Manifest entries sorted by logical key.
    pub fn assemble(&self, uploaded: &BTreeMap<String, PackageEntry>) -> Vec<ManifestEntry> {
        let mut merged: BTreeMap<String, ManifestEntry> = self
            .retained
            .iter()
            .map(|(path, entry)| (path.clone(), ManifestEntry::from_package_entry(path, entry)))
            .collect();

        for (path, entry) in uploaded {
            merged.insert(path.clone(), ManifestEntry::from_package_entry(path, entry));
        }
        for (path, entry) in &self.remote {
            merged.insert(path.clone(), entry.clone());
        }

        merged.into_values().collect()
    }
}

/// Entries the package would contain: staged files over the baseline, minus
/// deletions and empty-directory placeholders.
///
/// # Returns
/// Validation entries ordered by logical key.
pub fn files_state_to_entries(state: &FilesState) -> Vec<ValidationEntry> {
    let mut entries: BTreeMap<&str, ValidationEntry> = BTreeMap::new();

    for (path, entry) in &state.existing {
        entries.insert(
            path,
            ValidationEntry {
                logical_key: path.clone(),
                meta: user_meta(entry.meta.as_ref()),
                size: entry.size,
            },
        );
    }
    for (path, file) in &state.added {
        if file.is_empty_dir_marker() {
            entries.remove(path.as_str());
            continue;
        }
        entries.insert(
            path,
            ValidationEntry {
                logical_key: path.clone(),
                meta: user_meta(file.meta()),
                size: file.size(),
            },
        );
    }

    entries
        .into_iter()
        .filter(|(path, _)| !state.deleted.contains(*path))
        .map(|(_, entry)| entry)
        .collect()
}

/// Stub README for a package submitted without files.
///
/// The hash is computed right away so the file can be uploaded immediately.
pub fn create_readme_file(package_name: &str, config: &StagingConfig) -> LocalFile {
    let contents: String = format!(
        "# {name}\n\nStub README for the **{name}** package generated by Quilt Catalog\n",
        name = package_name
    );
    let file: LocalFile = LocalFile::from_bytes(README_PATH, contents.into_bytes());
    compute_hash_blocking(&file, config.checksum_type());
    file
}

/// Check a staged state and plan its submission.
///
/// # Arguments
/// * `state` - Staged files and baseline
/// * `config` - Package root and checksum settings
/// * `package_name` - Name of the package being created (`user/package`)
/// * `when_no_files` - What to do if the package would be empty
///
/// # Errors
/// Returns error if:
/// - the package name is empty
/// - hashing is still running or has failed for some file
/// - the package would be empty and `when_no_files` is `Reject`
pub fn plan_submission(
    state: &FilesState,
    config: &StagingConfig,
    package_name: &str,
    when_no_files: WhenNoFiles,
) -> Result<SubmissionPlan, StagingError> {
    if package_name.is_empty() {
        return Err(StagingError::PackageNameRequired);
    }
    ensure_hashing_complete(state)?;

    let groups: AddedFilesGroups = group_added_files(&state.added);
    let mut entries: Vec<ValidationEntry> = files_state_to_entries(state);

    let mut local: Vec<LocalEntry> = groups
        .local
        .into_iter()
        .filter(|LocalEntry { path, file }| match state.existing.get(path) {
            Some(existing) => file.hash().value().as_ref() != Some(&existing.hash),
            None => true,
        })
        .collect();

    if entries.is_empty() {
        match when_no_files {
            WhenNoFiles::Reject => return Err(StagingError::EmptyPackage),
            WhenNoFiles::Allow => log::info!("Submitting package {} without files", package_name),
            WhenNoFiles::AddReadme => {
                let readme: LocalFile = create_readme_file(package_name, config);
                entries.push(ValidationEntry {
                    logical_key: README_PATH.to_string(),
                    meta: EntryMeta::new(),
                    size: readme.size(),
                });
                local.push(LocalEntry {
                    path: README_PATH.to_string(),
                    file: readme,
                });
            }
        }
    }

    let to_upload: Vec<UploadItem> = local
        .into_iter()
        .map(|LocalEntry { path, file }| UploadItem {
            key: canonical_key(package_name, &path, &config.package_root),
            meta: state
                .existing
                .get(&path)
                .and_then(|e| e.meta.clone())
                .or_else(|| file.meta().cloned()),
            path,
            file,
        })
        .collect();

    let remote: BTreeMap<String, ManifestEntry> = groups
        .remote
        .into_iter()
        .map(|entry| {
            let manifest_entry: ManifestEntry = ManifestEntry {
                logical_key: entry.path.clone(),
                physical_key: entry.file.physical_key(),
                hash: None,
                meta: entry.file.meta.clone(),
                size: None,
            };
            (entry.path, manifest_entry)
        })
        .collect();

    let retained: BTreeMap<String, PackageEntry> = state
        .existing
        .iter()
        .filter(|(path, _)| !state.deleted.contains(*path))
        .map(|(path, entry)| (path.clone(), entry.clone()))
        .collect();

    log::debug!(
        "Planned submission of {}: {} to upload, {} referenced, {} retained",
        package_name,
        to_upload.len(),
        remote.len(),
        retained.len()
    );

    Ok(SubmissionPlan {
        to_upload,
        remote,
        retained,
        entries,
    })
}
