//! Path utilities for virtual package paths, local files and S3 URLs.
//!
//! Virtual package paths (logical keys) are always POSIX style: forward
//! slashes, no leading slash, directories carry a trailing slash.

use std::path::{Component, Path, PathBuf};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::PathError;

/// Characters escaped in S3 URL keys (everything `encodeURIComponent` escapes).
const S3_KEY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Convert a path to absolute without resolving symlinks.
///
/// # Arguments
/// * `path` - Path to convert (relative or absolute)
///
/// # Returns
/// Absolute path, joining with current directory if relative.
///
/// # Errors
/// Returns error if current directory cannot be determined.
pub fn to_absolute(path: &Path) -> Result<PathBuf, PathError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        std::env::current_dir()
            .map(|cwd: PathBuf| cwd.join(path))
            .map_err(|e: std::io::Error| PathError::from_io(path.display().to_string(), e))
    }
}

/// Lexical path normalization without filesystem access.
///
/// Removes `.` components and resolves `..` components lexically.
///
/// # Arguments
/// * `path` - Path to normalize
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !components.is_empty()
                    && !matches!(
                        components.last(),
                        Some(Component::ParentDir) | Some(Component::RootDir)
                    )
                {
                    components.pop();
                } else {
                    components.push(component);
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Convert a path to POSIX-style string (forward slashes).
///
/// # Arguments
/// * `path` - Path to convert
pub fn to_posix_path(path: &Path) -> String {
    path.components()
        .map(|c: Component| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Express a local path as a POSIX path relative to `root`.
///
/// Neither path has symlinks resolved; both are normalized lexically.
///
/// # Arguments
/// * `path` - Local path
/// * `root` - Directory the result is relative to
///
/// # Errors
/// Returns error if path is outside the root directory.
pub fn relative_posix_path(path: &Path, root: &Path) -> Result<String, PathError> {
    let normalized: PathBuf = lexical_normalize(&to_absolute(path)?);
    let normalized_root: PathBuf = lexical_normalize(&to_absolute(root)?);

    let relative: &Path =
        normalized
            .strip_prefix(&normalized_root)
            .map_err(|_| PathError::PathOutsideRoot {
                path: normalized.display().to_string(),
                root: normalized_root.display().to_string(),
            })?;

    Ok(to_posix_path(relative))
}

/// Append a trailing slash unless the path already ends with one.
pub fn ensure_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Strip every trailing slash.
pub fn ensure_no_slash(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Strip `prefix` from the start of `path`, returning `path` untouched otherwise.
pub fn without_prefix<'a>(prefix: &str, path: &'a str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or(path)
}

/// Strip a leading slash from a dropped file's relative path.
pub fn normalize_relative(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Last segment of a POSIX path, ignoring trailing slashes.
///
/// # Example
/// ```
/// use package_staging_common::basename;
///
/// assert_eq!(basename("root/inside/foo/bar/"), "bar");
/// assert_eq!(basename("file.txt"), "file.txt");
/// ```
pub fn basename(path: &str) -> &str {
    let trimmed: &str = ensure_no_slash(path);
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Join two POSIX path fragments and normalize the result.
///
/// Empty segments and `.` are dropped, `..` pops the previous segment, and a
/// trailing slash on the last fragment is kept. Joining two empty fragments
/// yields `.`.
///
/// # Example
/// ```
/// use package_staging_common::posix_join;
///
/// assert_eq!(posix_join("lorem/ipsum/", "bar"), "lorem/ipsum/bar");
/// assert_eq!(posix_join("root/nested/", "[$.quiltkeep$]"), "root/nested/[$.quiltkeep$]");
/// assert_eq!(posix_join("", "bar"), "bar");
/// ```
pub fn posix_join(base: &str, tail: &str) -> String {
    let joined: String = match (base.is_empty(), tail.is_empty()) {
        (true, true) => return ".".to_string(),
        (true, false) => tail.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base, tail),
    };
    posix_normalize(&joined)
}

/// Normalize a POSIX path lexically, keeping leading and trailing slashes.
pub fn posix_normalize(path: &str) -> String {
    let absolute: bool = path.starts_with('/');
    let trailing: bool = path.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push(segment);
                }
            }
            _ => segments.push(segment),
        }
    }

    let mut result: String = segments.join("/");
    if absolute {
        result.insert(0, '/');
    }
    if result.is_empty() {
        return if absolute { "/".to_string() } else { ".".to_string() };
    }
    if trailing && !result.ends_with('/') {
        result.push('/');
    }
    result
}

/// Location of an object in S3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Handle {
    /// Bucket name.
    pub bucket: String,
    /// Object key (decoded).
    pub key: String,
    /// Object version, if pinned.
    pub version: Option<String>,
}

/// Parse an `s3://bucket/key[?versionId=...]` physical key.
///
/// # Arguments
/// * `url` - Physical key from a package manifest
///
/// # Errors
/// Returns error if the scheme is not `s3` or the bucket is missing.
pub fn parse_s3_url(url: &str) -> Result<S3Handle, PathError> {
    let invalid = || PathError::InvalidS3Url {
        url: url.to_string(),
    };

    let rest: &str = url.strip_prefix("s3://").ok_or_else(invalid)?;
    let (location, query): (&str, Option<&str>) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };
    let (bucket, raw_key): (&str, &str) = location.split_once('/').unwrap_or((location, ""));
    if bucket.is_empty() {
        return Err(invalid());
    }

    let key: String = percent_decode_str(raw_key)
        .decode_utf8()
        .map_err(|_| invalid())?
        .into_owned();

    let mut version: Option<String> = None;
    for pair in query.unwrap_or_default().split('&') {
        if let Some(value) = pair.strip_prefix("versionId=") {
            let decoded: String = percent_decode_str(value)
                .decode_utf8()
                .map_err(|_| invalid())?
                .into_owned();
            version = Some(decoded);
        }
    }

    Ok(S3Handle {
        bucket: bucket.to_string(),
        key,
        version,
    })
}

/// Render an S3 location as a physical key URL.
///
/// Each key segment is percent-encoded; slashes are kept.
pub fn handle_to_s3_url(handle: &S3Handle) -> String {
    let key: String = handle
        .key
        .split('/')
        .map(|segment: &str| utf8_percent_encode(segment, S3_KEY_ESCAPE).to_string())
        .collect::<Vec<_>>()
        .join("/");

    match &handle.version {
        Some(version) => format!(
            "s3://{}/{}?versionId={}",
            handle.bucket,
            key,
            utf8_percent_encode(version, S3_KEY_ESCAPE)
        ),
        None => format!("s3://{}/{}", handle.bucket, key),
    }
}

/// S3 key a package's uploaded file is stored under.
///
/// # Arguments
/// * `package_name` - Package name (`user/package`)
/// * `logical_key` - Path of the file inside the package
/// * `package_root` - Key prefix configured for package data (may be empty)
pub fn canonical_key(package_name: &str, logical_key: &str, package_root: &str) -> String {
    format!("{}{}/{}", package_root, package_name, logical_key)
}
