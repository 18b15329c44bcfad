//! ImageMagick backend.
//!
//! Builds one command per job:
//!
//! ```text
//! magick [read settings] <source> [-quality Q] [ops...] -resize WxH[!] <target>
//! ```
//!
//! `WxH` keeps the aspect ratio (fits inside the box), `WxH!` forces the
//! exact size.

use std::{ffi::OsString, path::PathBuf};

use anyhow::{Result, bail};

use super::{
    ops::TransformOp,
    transform::{TransformError, Transformer},
};
use crate::{
    resolve::ResolvedJob,
    utils::exec::{Cmd, FilterRule},
};

/// Known-harmless stderr noise from ImageMagick.
static MAGICK_FILTER: FilterRule = FilterRule::new(&["WARNING: The convert command is deprecated"]);

/// Runs ImageMagick (`magick`, or the legacy `convert`).
#[derive(Debug, Clone)]
pub struct MagickTransformer {
    program: PathBuf,
}

impl MagickTransformer {
    /// Find ImageMagick on `PATH`, preferring `magick` over `convert`.
    pub fn detect() -> Result<Self> {
        match which::which("magick").or_else(|_| which::which("convert")) {
            Ok(program) => {
                crate::debug!("magick"; "using {}", program.display());
                Ok(Self { program })
            }
            Err(_) => bail!(
                "`magick` command not found\n  hint: install ImageMagick or run with `--transformer builtin`"
            ),
        }
    }

    #[cfg(test)]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for one job, excluding the program itself.
    pub fn command_args(job: &ResolvedJob, ops: &[TransformOp]) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        for op in ops.iter().filter(|op| op.is_read_setting()) {
            args.extend(op.magick_args().into_iter().map(OsString::from));
        }

        args.push(job.source_path.clone().into_os_string());

        if let Some(quality) = job.quality {
            args.push("-quality".into());
            args.push(quality.to_string().into());
        }

        for op in ops.iter().filter(|op| !op.is_read_setting()) {
            args.extend(op.magick_args().into_iter().map(OsString::from));
        }

        let res = job.resolution;
        let geometry = if job.proportional {
            format!("{}x{}", res.width, res.height)
        } else {
            format!("{}x{}!", res.width, res.height)
        };
        args.push("-resize".into());
        args.push(geometry.into());

        args.push(job.target_path.clone().into_os_string());
        args
    }
}

impl Transformer for MagickTransformer {
    fn name(&self) -> &'static str {
        "magick"
    }

    fn render(&self, job: &ResolvedJob, ops: &[TransformOp]) -> Result<Vec<String>, TransformError> {
        let cmd = Cmd::new(&self.program)
            .args(Self::command_args(job, ops))
            .filter(&MAGICK_FILTER);
        crate::debug!("magick"; "{}", cmd.display());

        cmd.run().map_err(|err| TransformError::Tool {
            tool: self.name().to_string(),
            path: job.target_path.clone(),
            message: format!("{err:#}"),
        })?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionMap, Resolution};

    fn job(proportional: bool, quality: Option<u8>) -> ResolvedJob {
        ResolvedJob {
            source_path: PathBuf::from("/res/logo.svg"),
            target_path: PathBuf::from("/out/logo.png"),
            resolution: Resolution {
                width: 64,
                height: 32,
            },
            proportional,
            quality,
            options: OptionMap::new(),
            optimize: true,
        }
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_exact_resize() {
        assert_eq!(
            strings(MagickTransformer::command_args(&job(false, None), &[])),
            vec!["/res/logo.svg", "-resize", "64x32!", "/out/logo.png"]
        );
    }

    #[test]
    fn test_settings_before_input_and_ops_after() {
        let ops = [
            TransformOp::Strip,
            TransformOp::Background("none".into()),
            TransformOp::Density { x: 300, y: None },
        ];
        assert_eq!(
            strings(MagickTransformer::command_args(&job(true, Some(85)), &ops)),
            vec![
                "-background",
                "none",
                "-density",
                "300",
                "/res/logo.svg",
                "-quality",
                "85",
                "-strip",
                "-resize",
                "64x32",
                "/out/logo.png",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_is_reported() {
        let backend = MagickTransformer::with_program("false");
        let err = backend.render(&job(false, None), &[]).unwrap_err();
        assert!(matches!(err, TransformError::Tool { .. }));
    }
}
