//! Pattern expansion: one image spec to many concrete jobs.
//!
//! # Flow
//!
//! ```text
//! spec.source_path ──► alias variants ──► resolve + anchor ──► glob ──► jobs
//!                      (first token only)  (basePath, `/`)
//! ```
//!
//! Source patterns use glob syntax (`*`, `?`, `[..]`; `**` for any depth).
//! Brace alternation (`{a,b}`) is not supported.
//!
//! A target ending in `*.<ext>` is rewritten per match to
//! `<target dir>/<source stem>.<ext>`; any other target is used verbatim.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use glob::{MatchOptions, Pattern};
use regex::Regex;
use rustc_hash::FxHashSet;
use thiserror::Error;

use super::{AliasTable, ResolvedJob};
use crate::{
    config::ImageSpec,
    log,
    utils::path::{anchor, to_slash},
};

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("invalid source pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Expand one spec into jobs, fanning out over the alias variants of the
/// first alias token in its source pattern.
///
/// Each variant is tried with a table where it shadows its namesakes; the
/// results are concatenated in variant order. Without any alias token the
/// spec is expanded once against `table`.
///
/// With several variants, a literal candidate that does not exist is dropped
/// when another variant found a file of the same name, so an existing
/// fallback is built instead of a missing override.
pub fn expand_spec(
    spec: &ImageSpec,
    table: &AliasTable,
    base_path: &Path,
) -> Result<Vec<ResolvedJob>, ExpandError> {
    let variants = table.variants_for(&spec.source_path);
    if variants.is_empty() {
        return expand_with(spec, table, base_path);
    }

    let mut jobs = Vec::new();
    for alias in &variants {
        let candidate = table.with_front((*alias).clone());
        jobs.extend(expand_with(spec, &candidate, base_path)?);
    }

    if variants.len() > 1 {
        let found: FxHashSet<OsString> = jobs
            .iter()
            .filter(|job| job.source_path.exists())
            .map(ResolvedJob::source_key)
            .collect();
        jobs.retain(|job| job.source_path.exists() || !found.contains(&job.source_key()));
    }
    Ok(jobs)
}

/// Expand one spec against a fixed alias table.
///
/// `base_path` is escaped before it becomes part of a glob pattern, so only
/// the configured pattern itself is interpreted.
pub fn expand_with(
    spec: &ImageSpec,
    table: &AliasTable,
    base_path: &Path,
) -> Result<Vec<ResolvedJob>, ExpandError> {
    let source = table.resolve(&spec.source_path);
    let target = to_slash(&anchor(base_path, table.resolve(&spec.target_path)));

    let sources = if has_magic(&source) {
        let escaped_base = PathBuf::from(Pattern::escape(&to_slash(base_path)));
        match_sources(&to_slash(&anchor(&escaped_base, &source)))?
    } else {
        // A missing literal surfaces later as a job failure instead of
        // silently vanishing.
        vec![PathBuf::from(to_slash(&anchor(base_path, &source)))]
    };

    let jobs = sources
        .into_iter()
        .map(|file| {
            let target = target_for(&target, &file);
            ResolvedJob::from_spec(spec, file, target)
        })
        .collect();
    Ok(jobs)
}

/// Files matching the glob `pattern`, in glob order. Directories never match.
pub fn match_sources(pattern: &str) -> Result<Vec<PathBuf>, ExpandError> {
    let entries = glob::glob_with(pattern, GLOB_OPTIONS).map_err(|source| ExpandError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_dir() => {}
            Ok(path) => files.push(path),
            Err(err) => {
                log!("warning"; "skipping `{}`: {}", err.path().display(), err.error());
            }
        }
    }
    Ok(files)
}

/// Whether `pattern` contains glob metacharacters.
#[inline]
pub fn has_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn wildcard_extension() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\.([A-Za-z0-9]+)$").expect("valid regex"))
}

/// Target path for one matched source file.
pub fn target_for(target: &str, source: &Path) -> PathBuf {
    let Some(caps) = wildcard_extension().captures(target) else {
        return PathBuf::from(target);
    };

    let extension = &caps[1];
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let file_name = format!("{stem}.{extension}");

    match Path::new(target).parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
