//! Configuration document helpers.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::ConfigError;
use crate::utils::path::anchor;

/// Read a config document, choosing the parser by file extension.
///
/// `.toml` files are parsed as TOML, everything else as JSON. Both end up
/// as a [`Value`] so the local document can be merged before typing.
pub fn read_document(path: &Path) -> Result<Value, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content).map_err(|err| ConfigError::Toml(path.to_path_buf(), err))
    } else {
        serde_json::from_str(&content).map_err(|err| ConfigError::Json(path.to_path_buf(), err))
    }
}

/// Shallow merge: every top-level key of `local` replaces the one in `base`.
///
/// # Example
/// ```text
/// base:   { "basePath": "a", "images": [..] }
/// local:  { "basePath": "b" }
/// result: { "basePath": "b", "images": [..] }
/// ```
pub fn merge_documents(base: &mut Value, local: Value) {
    match (base, local) {
        (Value::Object(base), Value::Object(local)) => {
            for (key, value) in local {
                base.insert(key, value);
            }
        }
        (base, local) => *base = local,
    }
}

/// Remove non-object entries (comments) from the list under `key`.
///
/// Returns the original index of every kept entry, so diagnostics can point
/// at the position the user actually wrote.
pub fn drop_comment_entries(doc: &mut Value, key: &str) -> Vec<usize> {
    let Some(Value::Array(entries)) = doc.get_mut(key) else {
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(entries.len());
    let mut index = 0;
    entries.retain(|entry| {
        let keep = entry.is_object();
        if keep {
            kept.push(index);
        }
        index += 1;
        keep
    });
    kept
}

/// Resolve `basePath` against the config file's directory.
///
/// A missing or blank value means the config directory itself; `~` is
/// expanded to the home directory.
pub fn resolve_base_path(raw: Option<&str>, config_dir: &Path) -> PathBuf {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let expanded = shellexpand::tilde(raw);
            anchor(config_dir, &*expanded)
        }
        _ => config_dir.to_path_buf(),
    }
}

// ============================================================================
// tests
// ============================================================================
