//! Working set of a package being created or edited.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use package_staging_model::{AddedFile, PackageEntry};

/// Files staged as added, keyed by virtual path.
pub type AddedMap = BTreeMap<String, AddedFile>;

/// Virtual paths marked for deletion.
pub type DeletedSet = BTreeSet<String>;

/// Baseline entries of the package being edited, keyed by virtual path.
pub type ExistingMap = BTreeMap<String, PackageEntry>;

/// Staged changes on top of a baseline package.
///
/// `existing` is the baseline and is only ever shadowed: a path in both
/// `existing` and `deleted` removes a baseline entry, a path in both
/// `existing` and `added` replaces one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilesState {
    /// Files to add or replace.
    pub added: AddedMap,
    /// Paths to remove.
    pub deleted: DeletedSet,
    /// Baseline package entries.
    pub existing: ExistingMap,
}

impl FilesState {
    /// Empty state for a new package.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for editing a package with the given entries.
    pub fn from_existing(existing: ExistingMap) -> Self {
        Self {
            existing,
            ..Self::default()
        }
    }

    /// State seeded with files to add (e.g. "add to package" from a bucket view).
    pub fn with_added(mut self, added: AddedMap) -> Self {
        self.added = added;
        self
    }

    /// Whether nothing is staged on top of the baseline.
    pub fn is_pristine(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }
}

/// Whether any key of `map` starts with `prefix`.
pub(crate) fn has_prefix<V>(prefix: &str, map: &BTreeMap<String, V>) -> bool {
    map.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .next()
        .map(|(key, _)| key.starts_with(prefix))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_prefix() {
        let mut map: BTreeMap<String, u8> = BTreeMap::new();
        map.insert("a/b/c".into(), 1);
        map.insert("x".into(), 2);

        assert!(has_prefix("a/b", &map));
        assert!(has_prefix("a/b/c", &map));
        assert!(has_prefix("", &map));
        assert!(!has_prefix("a/c", &map));
        assert!(!has_prefix("y", &map));
    }

    #[test]
    fn test_pristine() {
        assert!(FilesState::new().is_pristine());
        let mut state: FilesState = FilesState::new();
        state.deleted.insert("a".into());
        assert!(!state.is_pristine());
    }
}
