//! Per-entry metadata.

use serde_json::{Map, Value};

/// Free-form JSON object attached to a package entry.
pub type EntryMeta = Map<String, Value>;

/// The `user_meta` object of an entry's metadata, or an empty object.
pub fn user_meta(meta: Option<&EntryMeta>) -> EntryMeta {
    meta.and_then(|m| m.get("user_meta"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
