//! Image transformation: backend trait and the per-job driver.
//!
//! ```text
//! ResolvedJob ──► placeholder target ──► plan_ops(global, local) ──► backend.render
//! ```

use std::{fs::File, io, path::PathBuf};

use anyhow::Result;
use thiserror::Error;

use super::{
    builtin::BuiltinTransformer,
    magick::MagickTransformer,
    ops::{TransformOp, plan_ops},
};
use crate::{
    config::{OptionMap, TransformerKind},
    log,
    resolve::ResolvedJob,
};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("could not create `{}`", .path.display())]
    Placeholder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{tool}` failed for `{}`: {message}", .path.display())]
    Tool {
        tool: String,
        path: PathBuf,
        message: String,
    },

    #[error("could not decode `{}`", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not encode `{}`", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// An image transform backend.
pub trait Transformer {
    fn name(&self) -> &'static str;

    /// Render `job.source_path` into `job.target_path`, applying `ops`, the
    /// job's quality, and finally the resize.
    ///
    /// Returns warnings for operations the backend skipped.
    fn render(&self, job: &ResolvedJob, ops: &[TransformOp]) -> Result<Vec<String>, TransformError>;
}

/// What a successful transform left behind.
#[derive(Debug, Default)]
pub struct TransformReport {
    /// Skipped or unsupported options.
    pub warnings: Vec<String>,
}

/// Transform one job with `backend`.
///
/// The target is created empty before the backend runs (ImageMagick has
/// been seen writing broken PNG data into files that did not exist yet).
/// Options are global first with per-image entries layered on top.
pub fn transform(
    backend: &dyn Transformer,
    job: &ResolvedJob,
    global: &OptionMap,
) -> Result<TransformReport, TransformError> {
    File::create(&job.target_path).map_err(|source| TransformError::Placeholder {
        path: job.target_path.clone(),
        source,
    })?;

    let plan = plan_ops(global, &job.options);
    for warning in &plan.warnings {
        log!("warning"; "{warning}");
    }

    let mut warnings = plan.warnings;
    warnings.extend(backend.render(job, &plan.ops)?);
    Ok(TransformReport { warnings })
}

/// Create the configured backend.
///
/// `magick` needs ImageMagick on `PATH`; its absence is a setup error.
pub fn create_transformer(kind: TransformerKind) -> Result<Box<dyn Transformer>> {
    Ok(match kind {
        TransformerKind::Magick => Box::new(MagickTransformer::detect()?),
        TransformerKind::Builtin => Box::new(BuiltinTransformer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;
    use serde_json::json;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records the ops it was asked to apply; fails on demand.
    struct Recording {
        seen: RefCell<Vec<TransformOp>>,
        fail: bool,
    }

    impl Transformer for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn render(
            &self,
            job: &ResolvedJob,
            ops: &[TransformOp],
        ) -> Result<Vec<String>, TransformError> {
            self.seen.borrow_mut().extend_from_slice(ops);
            if self.fail {
                return Err(TransformError::Tool {
                    tool: "recording".into(),
                    path: job.target_path.clone(),
                    message: "boom".into(),
                });
            }
            Ok(vec!["backend note".into()])
        }
    }

    fn job(dir: &TempDir, options: serde_json::Value) -> ResolvedJob {
        ResolvedJob {
            source_path: dir.path().join("in.png"),
            target_path: dir.path().join("out.png"),
            resolution: Resolution {
                width: 4,
                height: 4,
            },
            proportional: false,
            quality: None,
            options: options.as_object().cloned().unwrap_or_default(),
            optimize: false,
        }
    }

    #[test]
    fn test_placeholder_created_before_render() {
        let dir = TempDir::new().unwrap();
        let backend = Recording {
            seen: RefCell::new(Vec::new()),
            fail: true,
        };
        let job = job(&dir, json!({}));

        assert!(transform(&backend, &job, &OptionMap::new()).is_err());
        // The failed render leaves the empty placeholder behind.
        assert_eq!(std::fs::metadata(&job.target_path).unwrap().len(), 0);
    }

    #[test]
    fn test_options_layered_and_warnings_collected() {
        let dir = TempDir::new().unwrap();
        let backend = Recording {
            seen: RefCell::new(Vec::new()),
            fail: false,
        };
        let global = json!({ "flip": [], "background": ["white"] });
        let job = job(&dir, json!({ "background": ["none"], "bogus": [] }));

        let report = transform(&backend, &job, global.as_object().unwrap()).unwrap();

        assert_eq!(
            *backend.seen.borrow(),
            vec![TransformOp::Flip, TransformOp::Background("none".into())]
        );
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("bogus"));
        assert_eq!(report.warnings[1], "backend note");
    }

    #[test]
    fn test_placeholder_failure() {
        let dir = TempDir::new().unwrap();
        let backend = Recording {
            seen: RefCell::new(Vec::new()),
            fail: false,
        };
        let mut job = job(&dir, json!({}));
        job.target_path = dir.path().join("missing-dir").join("out.png");

        assert!(matches!(
            transform(&backend, &job, &OptionMap::new()),
            Err(TransformError::Placeholder { .. })
        ));
        assert!(backend.seen.borrow().is_empty());
    }
}
