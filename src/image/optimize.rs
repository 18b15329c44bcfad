//! Lossless post-processing with `optipng` and `jpegtran`.
//!
//! | Extension        | Tool       | Command                                  |
//! |------------------|------------|------------------------------------------|
//! | `.png`           | `optipng`  | `optipng [args] -out <file> <file>`      |
//! | `.jpg`, `.jpeg`  | `jpegtran` | `jpegtran [args] -outfile <file> <file>` |
//!
//! Any other extension is left alone.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    config::{OptimizeSettings, OptimizerSetting},
    debug,
    utils::exec::Cmd,
};

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("`{0}` command not found")]
    ToolMissing(String),

    #[error("`{tool}` failed for `{}`: {message}", .path.display())]
    Failed {
        tool: &'static str,
        path: PathBuf,
        message: String,
    },
}

/// External optimizer programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerTool {
    Optipng,
    Jpegtran,
}

impl OptimizerTool {
    /// Tool for `path`, by case-insensitive extension.
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Optipng),
            "jpg" | "jpeg" => Some(Self::Jpegtran),
            _ => None,
        }
    }

    pub const fn program(self) -> &'static str {
        match self {
            Self::Optipng => "optipng",
            Self::Jpegtran => "jpegtran",
        }
    }

    const fn output_flag(self) -> &'static str {
        match self {
            Self::Optipng => "-out",
            Self::Jpegtran => "-outfile",
        }
    }

    fn setting(self, settings: &OptimizeSettings) -> &OptimizerSetting {
        match self {
            Self::Optipng => &settings.optipng,
            Self::Jpegtran => &settings.jpgtran,
        }
    }
}

/// What [`Optimizer::optimize`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeOutcome {
    Optimized(OptimizerTool),
    /// No tool for this extension, or the tool is disabled.
    Skipped,
}

/// Runs the configured optimizer for a written image, in place.
#[derive(Debug, Clone)]
pub struct Optimizer<'a> {
    settings: &'a OptimizeSettings,
    programs: FxHashMap<OptimizerTool, PathBuf>,
}

impl<'a> Optimizer<'a> {
    pub fn new(settings: &'a OptimizeSettings) -> Self {
        Self {
            settings,
            programs: FxHashMap::default(),
        }
    }

    /// Use `program` instead of the tool's default name.
    #[cfg(test)]
    pub fn with_program(mut self, tool: OptimizerTool, program: impl Into<PathBuf>) -> Self {
        self.programs.insert(tool, program.into());
        self
    }

    pub fn optimize(&self, path: &Path) -> Result<OptimizeOutcome, OptimizeError> {
        let Some(tool) = OptimizerTool::for_path(path) else {
            return Ok(OptimizeOutcome::Skipped);
        };
        let Some(args) = tool.setting(self.settings).args() else {
            return Ok(OptimizeOutcome::Skipped);
        };

        let program = self.locate(tool)?;
        let cmd = Cmd::new(program)
            .args(args)
            .arg(tool.output_flag())
            .arg(path)
            .arg(path);
        debug!("optimize"; "{}", cmd.display());

        cmd.run().map_err(|err| OptimizeError::Failed {
            tool: tool.program(),
            path: path.to_path_buf(),
            message: format!("{err:#}"),
        })?;
        Ok(OptimizeOutcome::Optimized(tool))
    }

    fn locate(&self, tool: OptimizerTool) -> Result<PathBuf, OptimizeError> {
        let name = self
            .programs
            .get(&tool)
            .map_or_else(|| PathBuf::from(tool.program()), Clone::clone);
        which::which(&name)
            .map_err(|_| OptimizeError::ToolMissing(name.to_string_lossy().into_owned()))
    }
}
