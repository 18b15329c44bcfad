//! Concrete source to target jobs.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::config::{ImageSpec, OptionMap, Resolution};

/// One filesystem-matched transform, derived from an [`ImageSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJob {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub resolution: Resolution,
    pub proportional: bool,
    pub quality: Option<u8>,
    /// Per-image options; global options are layered under these at transform time.
    pub options: OptionMap,
    pub optimize: bool,
}

impl ResolvedJob {
    pub fn from_spec(spec: &ImageSpec, source_path: PathBuf, target_path: PathBuf) -> Self {
        Self {
            source_path,
            target_path,
            resolution: spec.resolution,
            proportional: spec.proportional,
            quality: spec.quality,
            options: spec.options.clone(),
            optimize: spec.optimize,
        }
    }

    /// Deduplication key: the source file name.
    pub fn source_key(&self) -> OsString {
        self.source_path
            .file_name()
            .unwrap_or(self.source_path.as_os_str())
            .to_owned()
    }

    /// Directory the target is written into.
    pub fn target_dir(&self) -> Option<&Path> {
        self.target_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}
