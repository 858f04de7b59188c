//! Integration tests for every `FilesAction` transition.
//!
//! Each test builds a state, applies one action and checks the full result,
//! including that `existing` is never rewritten.

use std::collections::BTreeMap;
use std::sync::Arc;

use package_staging::{
    group_added_files, handle_files_action, FilesAction, FilesEntry, FilesEntryState,
    FilesEntryType, FilesState, StagingError,
};
use package_staging_model::{AddedFile, Checksum, ChecksumType, LocalFile, PackageEntry, S3File};
use serde_json::json;

fn existing_entry() -> PackageEntry {
    PackageEntry::new("s3://b/a", 0, Checksum::new(ChecksumType::Sha256Chunked, "h"))
}

fn converted_entry() -> AddedFile {
    AddedFile::S3(S3File::new("b", "a", 0))
}

fn local(name: &str) -> AddedFile {
    AddedFile::Local(LocalFile::from_bytes(name, Vec::<u8>::new()))
}

fn s3(key: &str) -> AddedFile {
    AddedFile::S3(S3File::new("bucket", key, 1))
}

fn added(pairs: &[(&str, AddedFile)]) -> BTreeMap<String, AddedFile> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn deleted(paths: &[&str]) -> std::collections::BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

fn existing(paths: &[&str]) -> BTreeMap<String, PackageEntry> {
    paths
        .iter()
        .map(|p| (p.to_string(), existing_entry()))
        .collect()
}

/// Apply an action with an empty initial state.
fn apply(action: FilesAction, state: &FilesState) -> Result<FilesState, StagingError> {
    let initial: Arc<FilesState> = Arc::new(FilesState::new());
    let state: Arc<FilesState> = Arc::new(state.clone());
    handle_files_action(&action, &initial, &state).map(|next| FilesState::clone(&next))
}

fn dir(name: &str) -> FilesEntry {
    FilesEntry::dir(name)
}

fn file(name: &str) -> FilesEntry {
    FilesEntry::file(name, FilesEntryState::Unchanged, FilesEntryType::Local, 0)
}

// ============================================================================
// Add / AddFolder / AddFromS3
// ============================================================================

#[test]
fn test_add_file() {
    let file: LocalFile = LocalFile::from_bytes("foo/bar.txt", Vec::<u8>::new());
    let next: FilesState = apply(
        FilesAction::Add {
            files: vec![file.clone()],
            prefix: Some(String::new()),
        },
        &FilesState::new(),
    )
    .unwrap();

    assert_eq!(next.added, added(&[("foo/bar.txt", AddedFile::Local(file))]));
    assert!(next.deleted.is_empty());
    assert!(next.existing.is_empty());
}

#[test]
fn test_add_file_to_prefix() {
    let file: LocalFile = LocalFile::from_bytes("foo/bar.txt", Vec::<u8>::new());
    let next: FilesState = apply(
        FilesAction::Add {
            files: vec![file.clone()],
            prefix: Some("root/nested/".into()),
        },
        &FilesState::new(),
    )
    .unwrap();

    assert_eq!(
        next.added,
        added(&[("root/nested/foo/bar.txt", AddedFile::Local(file))])
    );
}

#[test]
fn test_add_folder_inserts_marker() {
    let next: FilesState =
        apply(FilesAction::AddFolder("root/nested/".into()), &FilesState::new()).unwrap();

    assert_eq!(
        next.added,
        added(&[(
            "root/nested/[$.quiltkeep$]",
            AddedFile::S3(S3File::new("[$empty$]", "[$empty$]", 0)),
        )])
    );
}

#[test]
fn test_add_from_s3_clears_deleted() {
    let mut state: FilesState = FilesState::new();
    state.deleted = deleted(&["a/b/c"]);

    let mut files: BTreeMap<String, S3File> = BTreeMap::new();
    files.insert("a/b/c".into(), S3File::new("bucket", "c", 1));
    files.insert("x/y/z".into(), S3File::new("bucket", "z", 1));

    let next: FilesState = apply(FilesAction::AddFromS3(files), &state).unwrap();

    assert_eq!(
        next.added,
        added(&[
            ("a/b/c", AddedFile::S3(S3File::new("bucket", "c", 1))),
            ("x/y/z", AddedFile::S3(S3File::new("bucket", "z", 1))),
        ])
    );
    assert!(next.deleted.is_empty());
}

// ============================================================================
// Delete / DeleteDir
// ============================================================================

#[test]
fn test_delete() {
    let state: FilesState = FilesState {
        added: added(&[("a/b/c", local("c"))]),
        existing: existing(&["a/b/c"]),
        deleted: deleted(&["a/b/c"]),
    };

    let next: FilesState = apply(FilesAction::Delete("a/b/c".into()), &state).unwrap();

    assert_eq!(
        next,
        FilesState {
            added: BTreeMap::new(),
            ..state
        }
    );
}

#[test]
fn test_delete_dir() {
    let kept: AddedFile = local("C");
    let state: FilesState = FilesState {
        added: added(&[
            ("a/b/addedA", local("A")),
            ("a/b/addedB", local("B")),
            ("a/C/addedC", kept.clone()),
        ]),
        existing: existing(&["x/y/existingZ", "a/b/existingD", "a/b/existingE"]),
        deleted: deleted(&["a/b/deletedF", "x/y/deletedW"]),
    };

    let next: FilesState = apply(FilesAction::DeleteDir("a/b".into()), &state).unwrap();

    assert_eq!(next.added, added(&[("a/C/addedC", kept)]));
    assert_eq!(
        next.deleted,
        deleted(&["a/b/existingD", "a/b/existingE", "a/b/deletedF", "x/y/deletedW"])
    );
    assert_eq!(next.existing, state.existing);
}

// ============================================================================
// Meta
// ============================================================================

#[test]
fn test_meta_on_added_and_existing() {
    let state: FilesState = FilesState {
        added: added(&[("a/b/c", s3("c")), ("x/y/z", local("z"))]),
        existing: existing(&["a/b/c"]),
        deleted: deleted(&[]),
    };
    let meta = json!({ "foo": "bar" }).as_object().cloned();

    let next: FilesState = apply(
        FilesAction::Meta {
            path: "a/b/c".into(),
            meta: meta.clone(),
        },
        &state,
    )
    .unwrap();

    assert_eq!(next.added["a/b/c"].meta(), meta.as_ref());
    assert_eq!(next.added["x/y/z"].meta(), None);
    assert_eq!(next.existing["a/b/c"].meta, meta);
    assert!(state.existing["a/b/c"].meta.is_none());
}

#[test]
fn test_meta_on_local_file_shares_hash() {
    let original: LocalFile = LocalFile::from_bytes("z", b"zz".to_vec());
    let state: FilesState = FilesState::new().with_added(added(&[(
        "x/y/z",
        AddedFile::Local(original.clone()),
    )]));
    let meta = json!({ "foo": "bar" }).as_object().cloned();

    let next: FilesState = apply(
        FilesAction::Meta {
            path: "x/y/z".into(),
            meta: meta.clone(),
        },
        &state,
    )
    .unwrap();

    let updated: &LocalFile = next.added["x/y/z"].as_local().unwrap();
    assert_eq!(updated.meta(), meta.as_ref());
    assert!(original.meta().is_none());
    assert!(updated.hash().same_handle(original.hash()));
}

// ============================================================================
// Move
// ============================================================================

fn move_action(source: FilesEntry, source_prefix: Option<&str>, dest: FilesEntry) -> FilesAction {
    FilesAction::Move {
        source: Some((source, source_prefix.map(String::from))),
        dest: (dest, None),
    }
}

#[test]
fn test_move_added_file() {
    let foo: AddedFile = local("foo.txt");
    let state: FilesState =
        FilesState::new().with_added(added(&[("root/inside/foo.txt", foo.clone())]));

    let next: FilesState = apply(
        move_action(file("foo.txt"), Some("root/inside/"), dir("lorem/ipsum/")),
        &state,
    )
    .unwrap();

    assert_eq!(next.added, added(&[("lorem/ipsum/foo.txt", foo)]));
    assert!(next.deleted.is_empty());
}

#[test]
fn test_move_existing_file() {
    let state: FilesState = FilesState::from_existing(existing(&["root/inside/foo.txt"]));

    let next: FilesState = apply(
        move_action(file("foo.txt"), Some("root/inside/"), dir("lorem/ipsum/")),
        &state,
    )
    .unwrap();

    assert_eq!(next.added, added(&[("lorem/ipsum/foo.txt", converted_entry())]));
    assert_eq!(next.deleted, deleted(&["root/inside/foo.txt"]));
    assert_eq!(next.existing, state.existing);
}

#[test]
fn test_move_added_dir() {
    let a: AddedFile = local("a.txt");
    let b: AddedFile = local("b.txt");
    let state: FilesState = FilesState::new().with_added(added(&[
        ("root/inside/foo/bar/a.txt", a.clone()),
        ("root/inside/foo/bar/b.txt", b.clone()),
    ]));

    let next: FilesState = apply(
        move_action(dir("foo/bar/"), Some("root/inside/"), dir("lorem/ipsum/")),
        &state,
    )
    .unwrap();

    assert_eq!(
        next.added,
        added(&[("lorem/ipsum/bar/a.txt", a), ("lorem/ipsum/bar/b.txt", b)])
    );
    assert!(next.deleted.is_empty());
    assert!(next.existing.is_empty());
}

#[test]
fn test_move_existing_dir() {
    let state: FilesState = FilesState::from_existing(existing(&[
        "root/inside/foo/bar/a.txt",
        "root/inside/foo/bar/b.txt",
    ]));

    let next: FilesState = apply(
        move_action(dir("foo/bar/"), Some("root/inside/"), dir("lorem/ipsum/")),
        &state,
    )
    .unwrap();

    assert_eq!(
        next.added,
        added(&[
            ("lorem/ipsum/bar/a.txt", converted_entry()),
            ("lorem/ipsum/bar/b.txt", converted_entry()),
        ])
    );
    assert_eq!(
        next.deleted,
        deleted(&["root/inside/foo/bar/a.txt", "root/inside/foo/bar/b.txt"])
    );
}

#[test]
fn test_move_missing_file_fails() {
    let err: StagingError = apply(
        move_action(file("foo.txt"), None, dir("bar")),
        &FilesState::new(),
    )
    .unwrap_err();

    assert!(matches!(err, StagingError::MoveFile { .. }));
    assert_eq!(err.to_string(), "Failed to move file");
}

#[test]
fn test_move_missing_dir_fails() {
    let err: StagingError = apply(
        move_action(dir("foo"), None, dir("bar")),
        &FilesState::new(),
    )
    .unwrap_err();

    assert!(matches!(err, StagingError::MoveDirectory { .. }));
    assert_eq!(err.to_string(), "Failed to move directory");
}

// ============================================================================
// Revert / RevertDir / Reset
// ============================================================================

#[test]
fn test_revert() {
    let state: FilesState = FilesState {
        added: added(&[("a/b/c", s3("c")), ("x/y/z", s3("z"))]),
        existing: existing(&["a/b/c", "x/y/z"]),
        deleted: deleted(&["a/b/c", "x/y/z"]),
    };

    let next: FilesState = apply(FilesAction::Revert("a/b/c".into()), &state).unwrap();

    assert_eq!(
        next,
        FilesState {
            added: added(&[("x/y/z", s3("z"))]),
            deleted: deleted(&["x/y/z"]),
            existing: state.existing.clone(),
        }
    );
}

#[test]
fn test_revert_dir() {
    let state: FilesState = FilesState {
        added: added(&[("a/b/a", s3("a")), ("a/b/b", s3("b")), ("x/y/z", s3("z"))]),
        existing: existing(&["a/b/a", "a/b/b", "x/y/z"]),
        deleted: deleted(&["a/b/a", "a/b/b", "x/y/z"]),
    };

    let next: FilesState = apply(FilesAction::RevertDir("a/b".into()), &state).unwrap();

    assert_eq!(
        next,
        FilesState {
            added: added(&[("x/y/z", s3("z"))]),
            deleted: deleted(&["x/y/z"]),
            existing: state.existing.clone(),
        }
    );
}

#[test]
fn test_reset_returns_initial_reference() {
    let initial: Arc<FilesState> = Arc::new(FilesState::new());
    let state: Arc<FilesState> = Arc::new(FilesState {
        added: added(&[("any", s3("any"))]),
        existing: existing(&["any"]),
        deleted: deleted(&["any"]),
    });

    let next: Arc<FilesState> = handle_files_action(&FilesAction::Reset, &initial, &state).unwrap();

    assert!(Arc::ptr_eq(&next, &initial));
    assert_eq!(*next, FilesState::new());
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_group_mixed_files() {
    let state: FilesState = FilesState::new().with_added(added(&[
        ("foo.txt", local("foo.txt")),
        ("a.txt", s3("a.txt")),
        ("bar.js", local("bar.js")),
        ("b.jpg", s3("b.jpg")),
        ("empty/folder", AddedFile::S3(S3File::empty_dir_marker())),
    ]));

    let groups = group_added_files(&state.added);

    assert_eq!(
        groups.local.iter().map(|e| e.path.as_str()).collect::<Vec<_>>(),
        vec!["bar.js", "foo.txt"]
    );
    assert_eq!(
        groups.remote.iter().map(|e| e.path.as_str()).collect::<Vec<_>>(),
        vec!["a.txt", "b.jpg"]
    );
}
