//! Key renaming helpers behind the `Move` transition.

use std::collections::BTreeMap;

use package_staging_common::{basename, ensure_slash, posix_join};
use package_staging_model::{AddedFile, PackageEntry, S3File};

use crate::error::StagingError;
use crate::state::FilesState;

/// Move the value at `from` to `to`, returning a new map.
///
/// A missing `from` yields an unchanged copy.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use package_staging::rename_key;
///
/// let map: BTreeMap<String, u8> = [("a/b/c".to_string(), 1), ("d/e/f".to_string(), 2)].into();
/// let expected: BTreeMap<String, u8> = [("d/e/f".to_string(), 2), ("x/y/z".to_string(), 1)].into();
/// assert_eq!(rename_key("a/b/c", "x/y/z", &map), expected);
/// ```
pub fn rename_key<V: Clone>(
    from: &str,
    to: &str,
    map: &BTreeMap<String, V>,
) -> BTreeMap<String, V> {
    let mut renamed: BTreeMap<String, V> = map.clone();
    if let Some(value) = renamed.remove(from) {
        renamed.insert(to.to_string(), value);
    }
    renamed
}

/// Prefix replacement that moves `source_prefix` under `dest_path`,
/// keeping the source directory's own name: `x/y/*` into `a/b` becomes `a/b/y/*`.
fn directory_rename(source_prefix: &str, dest_path: &str) -> (String, String) {
    (
        ensure_slash(source_prefix),
        ensure_slash(&posix_join(dest_path, basename(source_prefix))),
    )
}

/// Move every key under `source_prefix` into `dest_path`, returning a new map.
///
/// The first occurrence of the source directory (with trailing slash) in each
/// matching key is replaced by the destination directory.
pub fn rename_keys<V: Clone>(
    source_prefix: &str,
    dest_path: &str,
    map: &BTreeMap<String, V>,
) -> BTreeMap<String, V> {
    let (from, to): (String, String) = directory_rename(source_prefix, dest_path);

    map.iter()
        .map(|(key, value)| {
            if key.starts_with(source_prefix) {
                (key.replacen(&from, &to, 1), value.clone())
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

/// Re-stage a baseline file at a new path.
///
/// The baseline entry becomes an S3 reference at `dest_path` and is marked
/// deleted at `source_path`; `existing` itself is not modified.
///
/// # Errors
/// Returns `MoveFile` if `source_path` is not a baseline entry, or a path
/// error if its physical key is not an S3 URL.
pub fn move_existing_to_added(
    source_path: &str,
    dest_path: &str,
    state: &FilesState,
) -> Result<FilesState, StagingError> {
    let entry: &PackageEntry = state
        .existing
        .get(source_path)
        .ok_or_else(|| StagingError::MoveFile {
            path: source_path.to_string(),
        })?;
    let converted: S3File = entry.to_s3_file()?;

    let mut next: FilesState = state.clone();
    next.added.insert(dest_path.to_string(), AddedFile::S3(converted));
    next.deleted.insert(source_path.to_string());
    Ok(next)
}

/// Re-stage every baseline file under `source_path` into `dest_path`.
///
/// # Errors
/// Returns a path error if any moved entry's physical key is not an S3 URL.
pub fn move_existing_directory_to_added(
    source_path: &str,
    dest_path: &str,
    state: &FilesState,
) -> Result<FilesState, StagingError> {
    let (from, to): (String, String) = directory_rename(source_path, dest_path);
    let mut next: FilesState = state.clone();

    for (key, entry) in state.existing.iter() {
        if !key.starts_with(source_path) {
            continue;
        }
        let new_key: String = key.replacen(&from, &to, 1);
        next.added.insert(new_key, AddedFile::S3(entry.to_s3_file()?));
        next.deleted.insert(key.clone());
    }

    Ok(next)
}
