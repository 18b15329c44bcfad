//! `transformer` key: which backend renders the images.

use std::fmt;

use serde::Deserialize;

/// Image transform backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransformerKind {
    /// Use ImageMagick (`magick`, or legacy `convert`).
    #[default]
    Magick,
    /// Use built-in Rust libraries.
    Builtin,
}

impl fmt::Display for TransformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Magick => "magick",
            Self::Builtin => "builtin",
        })
    }
}
