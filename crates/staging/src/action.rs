//! Staging actions and the reducer that applies them.

use std::collections::BTreeMap;
use std::sync::Arc;

use package_staging_common::{normalize_relative, posix_join, EMPTY_DIR_MARKER_PATH};
use package_staging_model::{AddedFile, EntryMeta, LocalFile, S3File};

use crate::entry::FilesEntry;
use crate::error::StagingError;
use crate::keys::{move_existing_directory_to_added, move_existing_to_added, rename_key, rename_keys};
use crate::state::{has_prefix, FilesState};

/// A tree node together with the prefix of the directory it sits in.
pub type EntryAt = (FilesEntry, Option<String>);

/// A change requested by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum FilesAction {
    /// Stage local files at `prefix + relative path` (or name).
    Add {
        files: Vec<LocalFile>,
        prefix: Option<String>,
    },
    /// Stage an empty directory at the given path.
    AddFolder(String),
    /// Stage references to S3 objects, keyed by virtual path.
    AddFromS3(BTreeMap<String, S3File>),
    /// Remove a file.
    Delete(String),
    /// Remove every file under a prefix.
    DeleteDir(String),
    /// Replace a file's metadata.
    Meta {
        path: String,
        meta: Option<EntryMeta>,
    },
    /// Move a file or directory into the `dest` directory.
    Move {
        source: Option<EntryAt>,
        dest: EntryAt,
    },
    /// Drop pending changes to a path.
    Revert(String),
    /// Drop pending changes to every path under a prefix.
    RevertDir(String),
    /// Drop all pending changes.
    Reset,
}

impl FilesAction {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "Add",
            Self::AddFolder(_) => "AddFolder",
            Self::AddFromS3(_) => "AddFromS3",
            Self::Delete(_) => "Delete",
            Self::DeleteDir(_) => "DeleteDir",
            Self::Meta { .. } => "Meta",
            Self::Move { .. } => "Move",
            Self::Revert(_) => "Revert",
            Self::RevertDir(_) => "RevertDir",
            Self::Reset => "Reset",
        }
    }
}

/// Virtual path a dropped local file is staged under.
fn local_path(file: &LocalFile, prefix: Option<&str>) -> String {
    let path: &str = file.relative_path().unwrap_or_else(|| file.name());
    format!("{}{}", prefix.unwrap_or(""), normalize_relative(path))
}

fn prefixed(prefix: Option<&str>, name: &str) -> String {
    format!("{}{}", prefix.unwrap_or(""), name)
}

/// Apply an action to a state, producing the next state.
///
/// Neither `state` nor `initial` is modified. `Reset` returns `initial`
/// itself, so callers can detect a pristine form with `Arc::ptr_eq`.
///
/// # Arguments
/// * `action` - Change to apply
/// * `initial` - State the form was opened with
/// * `state` - Current state
///
/// # Returns
/// The next state.
///
/// # Errors
/// Returns `MoveFile` or `MoveDirectory` if a move's source is neither staged
/// nor in the baseline, or a path error if a moved baseline entry has an
/// unparseable physical key.
pub fn handle_files_action(
    action: &FilesAction,
    initial: &Arc<FilesState>,
    state: &Arc<FilesState>,
) -> Result<Arc<FilesState>, StagingError> {
    log::debug!("Applying {} action", action.name());

    let next: FilesState = match action {
        FilesAction::Add { files, prefix } => {
            let mut next: FilesState = FilesState::clone(state);
            for file in files {
                let path: String = local_path(file, prefix.as_deref());
                next.deleted.remove(&path);
                next.added.insert(path, AddedFile::Local(file.clone()));
            }
            next
        }

        FilesAction::AddFolder(path) => {
            let mut next: FilesState = FilesState::clone(state);
            next.added.insert(
                posix_join(path, EMPTY_DIR_MARKER_PATH),
                AddedFile::S3(S3File::empty_dir_marker()),
            );
            next.deleted.remove(path);
            next
        }

        FilesAction::AddFromS3(files) => {
            let mut next: FilesState = FilesState::clone(state);
            for (path, file) in files {
                next.deleted.remove(path);
                next.added.insert(path.clone(), AddedFile::S3(file.clone()));
            }
            next
        }

        FilesAction::Delete(path) => {
            let mut next: FilesState = FilesState::clone(state);
            next.added.remove(path);
            next.deleted.insert(path.clone());
            next
        }

        FilesAction::DeleteDir(prefix) => {
            let mut next: FilesState = FilesState::clone(state);
            next.added.retain(|key, _| !key.starts_with(prefix.as_str()));
            next.deleted.extend(
                state
                    .existing
                    .keys()
                    .filter(|key| key.starts_with(prefix.as_str()))
                    .cloned(),
            );
            next
        }

        FilesAction::Meta { path, meta } => {
            if !state.added.contains_key(path) && !state.existing.contains_key(path) {
                return Ok(Arc::clone(state));
            }
            let mut next: FilesState = FilesState::clone(state);
            if let Some(file) = state.added.get(path) {
                next.added.insert(path.clone(), file.with_meta(meta.clone()));
            }
            if let Some(entry) = next.existing.get_mut(path) {
                entry.meta = meta.clone();
            }
            next
        }

        FilesAction::Move { source, dest } => {
            let Some((source_entry, source_prefix)) = source else {
                return Ok(Arc::clone(state));
            };
            let (dest_dir, dest_prefix) = dest;
            let source_path: String = prefixed(source_prefix.as_deref(), source_entry.name());
            let dest_dir_path: String = prefixed(dest_prefix.as_deref(), dest_dir.name());

            match source_entry {
                FilesEntry::Dir { .. } => move_directory(&source_path, &dest_dir_path, state)?,
                FilesEntry::File { name, .. } => {
                    move_file(&source_path, &format!("{}{}", dest_dir_path, name), state)?
                }
            }
        }

        FilesAction::Revert(path) => {
            let mut next: FilesState = FilesState::clone(state);
            next.added.remove(path);
            next.deleted.remove(path);
            next
        }

        FilesAction::RevertDir(prefix) => {
            let mut next: FilesState = FilesState::clone(state);
            next.added.retain(|key, _| !key.starts_with(prefix.as_str()));
            next.deleted.retain(|key| !key.starts_with(prefix.as_str()));
            next
        }

        FilesAction::Reset => return Ok(Arc::clone(initial)),
    };

    Ok(Arc::new(next))
}

fn move_file(
    source_path: &str,
    dest_path: &str,
    state: &FilesState,
) -> Result<FilesState, StagingError> {
    if state.existing.contains_key(source_path) {
        return move_existing_to_added(source_path, dest_path, state);
    }
    if state.added.contains_key(source_path) {
        return Ok(FilesState {
            added: rename_key(source_path, dest_path, &state.added),
            ..state.clone()
        });
    }
    log::warn!("Cannot move \"{}\": no such file", source_path);
    Err(StagingError::MoveFile {
        path: source_path.to_string(),
    })
}

fn move_directory(
    source_path: &str,
    dest_path: &str,
    state: &FilesState,
) -> Result<FilesState, StagingError> {
    if has_prefix(source_path, &state.existing) {
        return move_existing_directory_to_added(source_path, dest_path, state);
    }
    if has_prefix(source_path, &state.added) {
        return Ok(FilesState {
            added: rename_keys(source_path, dest_path, &state.added),
            ..state.clone()
        });
    }
    log::warn!("Cannot move \"{}\": no such directory", source_path);
    Err(StagingError::MoveDirectory {
        path: source_path.to_string(),
    })
}

/// Reducer bound to the state a form was opened with.
///
/// Holds the current state and applies actions to it in order; a failed
/// action leaves the current state in place.
#[derive(Debug, Clone)]
pub struct FilesReducer {
    initial: Arc<FilesState>,
    current: Arc<FilesState>,
}

impl FilesReducer {
    /// Start from `initial`.
    pub fn new(initial: FilesState) -> Self {
        let initial: Arc<FilesState> = Arc::new(initial);
        Self {
            current: Arc::clone(&initial),
            initial,
        }
    }

    /// Apply an action to the current state.
    ///
    /// # Errors
    /// See [`handle_files_action`].
    pub fn dispatch(&mut self, action: &FilesAction) -> Result<&Arc<FilesState>, StagingError> {
        self.current = handle_files_action(action, &self.initial, &self.current)?;
        Ok(&self.current)
    }

    /// Current state.
    pub fn state(&self) -> &Arc<FilesState> {
        &self.current
    }

    /// State the reducer was created with.
    pub fn initial(&self) -> &Arc<FilesState> {
        &self.initial
    }

    /// Whether the current state is the initial one (no changes, or reset).
    pub fn is_pristine(&self) -> bool {
        Arc::ptr_eq(&self.initial, &self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use package_staging_model::{Checksum, ChecksumType, PackageEntry};

    fn entry(key: &str) -> PackageEntry {
        PackageEntry::new(
            format!("s3://bucket/{}", key),
            1,
            Checksum::new(ChecksumType::Sha256, "h"),
        )
    }

    fn apply(action: FilesAction, state: FilesState) -> Result<FilesState, StagingError> {
        let state: Arc<FilesState> = Arc::new(state);
        handle_files_action(&action, &state, &state).map(|s| FilesState::clone(&s))
    }

    #[test]
    fn test_add_uses_prefix_and_relative_path() {
        let mut state: FilesState = FilesState::new();
        state.deleted.insert("dir/sub/a.txt".into());
        let file: LocalFile = LocalFile::from_bytes("a.txt", b"a".to_vec()).with_relative_path("/sub/a.txt");
        let plain: LocalFile = LocalFile::from_bytes("b.txt", b"b".to_vec());

        let next: FilesState = apply(
            FilesAction::Add {
                files: vec![file.clone(), plain.clone()],
                prefix: Some("dir/".into()),
            },
            state,
        )
        .unwrap();

        assert_eq!(next.added.get("dir/sub/a.txt"), Some(&AddedFile::Local(file)));
        assert_eq!(next.added.get("dir/b.txt"), Some(&AddedFile::Local(plain)));
        assert!(next.deleted.is_empty());
    }

    #[test]
    fn test_add_folder() {
        let mut state: FilesState = FilesState::new();
        state.deleted.insert("root/nested/".into());

        let next: FilesState = apply(FilesAction::AddFolder("root/nested/".into()), state).unwrap();

        assert_eq!(next.added.len(), 1);
        assert_eq!(
            next.added.get("root/nested/[$.quiltkeep$]"),
            Some(&AddedFile::S3(S3File::empty_dir_marker()))
        );
        assert!(next.deleted.is_empty());
    }

    #[test]
    fn test_delete_dir_shadows_existing() {
        let mut state: FilesState = FilesState::new();
        state.added.insert("a/b/x".into(), S3File::new("b", "x", 1).into());
        state.added.insert("a/C/y".into(), S3File::new("b", "y", 1).into());
        state.existing.insert("a/b/z".into(), entry("z"));
        state.deleted.insert("q".into());

        let next: FilesState = apply(FilesAction::DeleteDir("a/b".into()), state.clone()).unwrap();

        assert_eq!(next.added.keys().collect::<Vec<_>>(), vec!["a/C/y"]);
        assert_eq!(next.deleted.iter().collect::<Vec<_>>(), vec!["a/b/z", "q"]);
        assert_eq!(next.existing, state.existing);
    }

    #[test]
    fn test_meta_on_missing_path_is_noop() {
        let state: Arc<FilesState> = Arc::new(FilesState::new());
        let action: FilesAction = FilesAction::Meta {
            path: "nope".into(),
            meta: None,
        };
        let next: Arc<FilesState> = handle_files_action(&action, &state, &state).unwrap();
        assert!(Arc::ptr_eq(&next, &state));
    }

    #[test]
    fn test_move_without_source_is_noop() {
        let state: Arc<FilesState> = Arc::new(FilesState::new());
        let action: FilesAction = FilesAction::Move {
            source: None,
            dest: (FilesEntry::dir("x/"), None),
        };
        let next: Arc<FilesState> = handle_files_action(&action, &state, &state).unwrap();
        assert!(Arc::ptr_eq(&next, &state));
    }

    #[test]
    fn test_reset_returns_initial() {
        let initial: Arc<FilesState> = Arc::new(FilesState::new());
        let mut reducer: FilesReducer = FilesReducer {
            initial: Arc::clone(&initial),
            current: Arc::clone(&initial),
        };
        reducer.dispatch(&FilesAction::Delete("x".into())).unwrap();
        assert!(!reducer.is_pristine());

        reducer.dispatch(&FilesAction::Reset).unwrap();
        assert!(reducer.is_pristine());
        assert!(Arc::ptr_eq(reducer.state(), &initial));
    }

    #[test]
    fn test_failed_dispatch_keeps_state() {
        let mut reducer: FilesReducer = FilesReducer::new(FilesState::new());
        reducer.dispatch(&FilesAction::Delete("x".into())).unwrap();
        let before: Arc<FilesState> = Arc::clone(reducer.state());

        let result = reducer.dispatch(&FilesAction::Move {
            source: Some((FilesEntry::dir("missing/"), None)),
            dest: (FilesEntry::dir("x/"), None),
        });

        assert!(matches!(result, Err(StagingError::MoveDirectory { .. })));
        assert!(Arc::ptr_eq(reducer.state(), &before));
    }
}
