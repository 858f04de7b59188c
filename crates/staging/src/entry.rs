//! Tree projection of a `FilesState` for display.
//!
//! The tree is derived on demand and never mutated; `Move` actions refer to
//! its nodes by name plus the prefix of the directory they sit in.

use std::collections::BTreeMap;

use package_staging_model::{AddedFile, EntryMeta, HashStatus, PackageEntry};

use crate::state::FilesState;

/// Display state of a file or directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilesEntryState {
    /// Baseline entry marked for deletion.
    Deleted,
    /// Baseline entry replaced with different content, or a directory with mixed states.
    Modified,
    /// Baseline entry left as is (or re-added with identical content).
    Unchanged,
    /// Local file whose hash is still being computed.
    Hashing,
    /// New entry.
    Added,
    /// Local file whose hash could not be computed.
    Invalid,
}

/// Where a file's content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilesEntryType {
    /// Object already in S3 (including baseline entries).
    S3,
    /// Local file to upload.
    Local,
    /// Empty-directory placeholder, not shown as a file.
    Hidden,
}

/// Node of the file tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilesEntry {
    /// Directory; `name` carries a trailing slash.
    Dir {
        name: String,
        state: FilesEntryState,
        child_entries: Vec<FilesEntry>,
    },
    /// File; `name` is the last path segment.
    File {
        name: String,
        state: FilesEntryState,
        entry_type: FilesEntryType,
        size: u64,
        meta: Option<EntryMeta>,
    },
}

impl FilesEntry {
    /// Directory node without children (enough to address it in a `Move`).
    pub fn dir(name: impl Into<String>) -> Self {
        Self::Dir {
            name: name.into(),
            state: FilesEntryState::Unchanged,
            child_entries: Vec::new(),
        }
    }

    /// File node without metadata.
    pub fn file(
        name: impl Into<String>,
        state: FilesEntryState,
        entry_type: FilesEntryType,
        size: u64,
    ) -> Self {
        Self::File {
            name: name.into(),
            state,
            entry_type,
            size,
            meta: None,
        }
    }

    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            Self::Dir { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Node state.
    pub fn state(&self) -> FilesEntryState {
        match self {
            Self::Dir { state, .. } | Self::File { state, .. } => *state,
        }
    }

    /// Whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Dir { .. })
    }
}

/// State of a staged file relative to its baseline entry, if any.
fn added_state(file: &AddedFile, baseline: Option<&PackageEntry>) -> FilesEntryState {
    match file {
        AddedFile::Local(local) => match local.hash().status() {
            HashStatus::Pending => FilesEntryState::Hashing,
            HashStatus::Failed(_) => FilesEntryState::Invalid,
            HashStatus::Ready(value) => match baseline {
                Some(entry) if entry.hash == value => FilesEntryState::Unchanged,
                Some(_) => FilesEntryState::Modified,
                None => FilesEntryState::Added,
            },
        },
        AddedFile::S3(_) if baseline.is_some() => FilesEntryState::Modified,
        AddedFile::S3(_) => FilesEntryState::Added,
    }
}

fn added_type(file: &AddedFile) -> FilesEntryType {
    match file {
        AddedFile::Local(_) => FilesEntryType::Local,
        AddedFile::S3(s3) if s3.is_empty_dir_marker() => FilesEntryType::Hidden,
        AddedFile::S3(_) => FilesEntryType::S3,
    }
}

fn added_node(name: &str, file: &AddedFile, baseline: Option<&PackageEntry>) -> FilesEntry {
    FilesEntry::File {
        name: name.to_string(),
        state: added_state(file, baseline),
        entry_type: added_type(file),
        size: file.size(),
        meta: file.meta().cloned(),
    }
}

/// A directory's state: its children's common state, or `Modified` if they differ.
fn common_state(children: &[FilesEntry]) -> FilesEntryState {
    let mut states = children.iter().map(FilesEntry::state);
    let first: FilesEntryState = states.next().unwrap_or(FilesEntryState::Unchanged);
    if states.all(|s| s == first) {
        first
    } else {
        FilesEntryState::Modified
    }
}

#[derive(Default)]
struct DirBuilder {
    dirs: BTreeMap<String, DirBuilder>,
    files: Vec<FilesEntry>,
}

impl DirBuilder {
    fn insert(&mut self, path: &str, node: impl FnOnce(&str) -> FilesEntry) {
        match path.split_once('/') {
            Some((dir, rest)) => self
                .dirs
                .entry(format!("{}/", dir))
                .or_default()
                .insert(rest, node),
            None => self.files.push(node(path)),
        }
    }

    fn build(self) -> Vec<FilesEntry> {
        let mut entries: Vec<FilesEntry> = self
            .dirs
            .into_iter()
            .map(|(name, dir)| {
                let child_entries: Vec<FilesEntry> = dir.build();
                FilesEntry::Dir {
                    name,
                    state: common_state(&child_entries),
                    child_entries,
                }
            })
            .collect();

        let mut files: Vec<FilesEntry> = self.files;
        files.sort_by(|a, b| a.name().cmp(b.name()));
        entries.extend(files);
        entries
    }
}

/// Project the state into a sorted tree: directories first, then files, by name.
///
/// # Arguments
/// * `state` - Staged files and baseline
///
/// # Returns
/// Top-level entries of the tree.
pub fn compute_entries(state: &FilesState) -> Vec<FilesEntry> {
    let mut root: DirBuilder = DirBuilder::default();

    for (path, entry) in &state.existing {
        if state.deleted.contains(path) {
            root.insert(path, |name| FilesEntry::File {
                name: name.to_string(),
                state: FilesEntryState::Deleted,
                entry_type: FilesEntryType::S3,
                size: entry.size,
                meta: entry.meta.clone(),
            });
        } else if let Some(file) = state.added.get(path) {
            root.insert(path, |name| added_node(name, file, Some(entry)));
        } else {
            root.insert(path, |name| FilesEntry::File {
                name: name.to_string(),
                state: FilesEntryState::Unchanged,
                entry_type: FilesEntryType::S3,
                size: entry.size,
                meta: entry.meta.clone(),
            });
        }
    }

    for (path, file) in &state.added {
        if !state.existing.contains_key(path) {
            root.insert(path, |name| added_node(name, file, None));
        }
    }

    root.build()
}
