//! Turning an S3 browser selection into staged references.

use std::collections::BTreeMap;

use package_staging_common::without_prefix;
use package_staging_model::S3File;

/// Key objects selected in an S3 listing by their path inside the package.
///
/// Each object's key loses the listing path it was selected under and gains
/// `dest_prefix`, so selecting `data/2024/a.csv` while browsing `data/` into
/// the package directory `raw/` stages it at `raw/2024/a.csv`. The result is
/// meant for `FilesAction::AddFromS3`.
///
/// # Arguments
/// * `listing_path` - Key prefix of the listing the selection was made in
/// * `objects` - Selected objects, including the contents of selected directories
/// * `dest_prefix` - Package directory to add them to (empty for the root)
pub fn s3_selection_to_files(
    listing_path: &str,
    objects: &[S3File],
    dest_prefix: &str,
) -> BTreeMap<String, S3File> {
    objects
        .iter()
        .map(|object| {
            let path: String = format!("{}{}", dest_prefix, without_prefix(listing_path, &object.key));
            (path, object.clone())
        })
        .collect()
}
