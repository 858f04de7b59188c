//! Splitting staged files by where their content comes from.

use package_staging_model::{AddedFile, LocalFile, S3File};

use crate::state::AddedMap;

/// A staged local file and its virtual path.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalEntry {
    /// Virtual path in the package.
    pub path: String,
    /// File to upload.
    pub file: LocalFile,
}

/// A staged S3 reference and its virtual path.
#[derive(Debug, Clone, PartialEq)]
pub struct S3Entry {
    /// Virtual path in the package.
    pub path: String,
    /// Referenced object.
    pub file: S3File,
}

/// Staged files grouped by source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddedFilesGroups {
    /// Local files that need uploading.
    pub local: Vec<LocalEntry>,
    /// Objects already in S3 that only need a manifest entry.
    pub remote: Vec<S3Entry>,
}

impl AddedFilesGroups {
    /// Whether both groups are empty.
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }
}

/// Group staged files into local uploads and S3 references.
///
/// Empty-directory placeholders are dropped. Both groups are ordered by path.
///
/// # Arguments
/// * `added` - Staged files keyed by virtual path
pub fn group_added_files(added: &AddedMap) -> AddedFilesGroups {
    let mut groups: AddedFilesGroups = AddedFilesGroups::default();

    for (path, file) in added {
        match file {
            AddedFile::S3(s3) if s3.is_empty_dir_marker() => {}
            AddedFile::S3(s3) => groups.remote.push(S3Entry {
                path: path.clone(),
                file: s3.clone(),
            }),
            AddedFile::Local(local) => groups.local.push(LocalEntry {
                path: path.clone(),
                file: local.clone(),
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_added_files() {
        let mut added: AddedMap = AddedMap::new();
        let local: LocalFile = LocalFile::from_bytes("a.txt", b"a".to_vec());
        added.insert("a.txt".into(), local.clone().into());
        added.insert("dir/b.csv".into(), S3File::new("bucket", "b.csv", 10).into());
        added.insert("empty/[$.quiltkeep$]".into(), S3File::empty_dir_marker().into());

        let groups: AddedFilesGroups = group_added_files(&added);

        assert_eq!(
            groups.local,
            vec![LocalEntry {
                path: "a.txt".into(),
                file: local,
            }]
        );
        assert_eq!(
            groups.remote,
            vec![S3Entry {
                path: "dir/b.csv".into(),
                file: S3File::new("bucket", "b.csv", 10),
            }]
        );
    }

    #[test]
    fn test_only_markers_is_empty() {
        let mut added: AddedMap = AddedMap::new();
        added.insert("x/[$.quiltkeep$]".into(), S3File::empty_dir_marker().into());
        assert!(group_added_files(&added).is_empty());
    }
}
