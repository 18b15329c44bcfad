//! Tag selection.
//!
//! An image spec carries comma-separated tags (`"icon,splash"`). A run
//! requests a set of tags (default `all`); a spec takes part when the two
//! sets intersect. `all` is an ordinary tag: it only matches specs that list
//! it explicitly.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::config::ImageSpec;

/// Tag requested when none is given.
pub const DEFAULT_TAG: &str = "all";

/// Split a comma-separated tag list, trimming entries and dropping empty ones.
pub fn split_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// The set of tags requested for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    requested: FxHashSet<String>,
    /// Requested tags in the order given, for display.
    order: Vec<String>,
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::new([DEFAULT_TAG])
    }
}

impl TagFilter {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requested = FxHashSet::default();
        let mut order = Vec::new();
        for tag in tags {
            for tag in split_tags(tag.as_ref()) {
                if requested.insert(tag.clone()) {
                    order.push(tag);
                }
            }
        }
        if order.is_empty() {
            return Self::default();
        }
        Self { requested, order }
    }

    /// Whether any of `tags` was requested.
    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|tag| self.requested.contains(tag.as_ref()))
    }

    /// Specs selected for this run, in config order.
    pub fn select<'a>(&self, specs: &'a [ImageSpec]) -> Vec<&'a ImageSpec> {
        specs.iter().filter(|spec| self.matches(&spec.tags)).collect()
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.order.join(","))
    }
}
