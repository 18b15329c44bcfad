//! Config field path used in diagnostics.

use owo_colors::OwoColorize;
use std::borrow::Cow;
use std::fmt;

/// Path of a config field, e.g. `images[2].resolution`.
///
/// Top-level keys are static; entries inside `images`/`aliases` carry their
/// index so a diagnostic points at the exact entry.
///
/// ```ignore
/// diag.error(FieldPath::new("basePath"), "must be a string");
/// diag.error(FieldPath::entry("images", 2, "resolution"), "expected `WxH`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Cow<'static, str>);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(Cow::Borrowed(path))
    }

    /// Field of the `index`-th entry of a list section.
    pub fn entry(section: &str, index: usize, field: &str) -> Self {
        if field.is_empty() {
            Self(Cow::Owned(format!("{section}[{index}]")))
        } else {
            Self(Cow::Owned(format!("{section}[{index}].{field}")))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self(Cow::Owned(path))
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
