//! Sequential job execution.
//!
//! Jobs run one at a time, in resolution order:
//!
//! ```text
//! ensure target dir ──► source exists? ──► transform ──► optimize (if enabled)
//!        │                    │                │              │
//!      Failed              Failed          Degraded        Degraded
//! ```
//!
//! A failing stage is logged and recorded on that job's outcome; the next
//! job always runs. The placeholder written before each transform relies
//! on there being a single writer at a time.

use std::fs;

use super::outcome::{JobError, JobOutcome, StageIssue};
use crate::{
    config::{OptionMap, PipelineConfig},
    debug,
    image::{OptimizeOutcome, Optimizer, Transformer, transform},
    log,
    logger::ProgressLine,
    resolve::ResolvedJob,
};

pub struct JobSequencer<'a> {
    transformer: &'a dyn Transformer,
    optimizer: Optimizer<'a>,
    options: &'a OptionMap,
    progress: bool,
}

impl<'a> JobSequencer<'a> {
    pub fn new(transformer: &'a dyn Transformer, config: &'a PipelineConfig) -> Self {
        Self {
            transformer,
            optimizer: Optimizer::new(&config.optimize),
            options: &config.options,
            progress: false,
        }
    }

    #[cfg(test)]
    pub fn with_optimizer(mut self, optimizer: Optimizer<'a>) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Show a `jobs(i/N)` progress line while running.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Run every job in order and return one outcome per job.
    pub fn run(&self, jobs: &[ResolvedJob]) -> Vec<JobOutcome> {
        let progress = (self.progress && !jobs.is_empty())
            .then(|| ProgressLine::new(&[("jobs", jobs.len())]));

        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in jobs {
            outcomes.push(self.run_job(job));
            if let Some(progress) = &progress {
                progress.inc("jobs");
            }
        }

        if let Some(progress) = progress {
            progress.finish();
        }
        outcomes
    }

    fn run_job(&self, job: &ResolvedJob) -> JobOutcome {
        let (source, target) = (&job.source_path, &job.target_path);

        if let Some(dir) = job.target_dir()
            && !dir.is_dir()
        {
            if let Err(err) = fs::create_dir_all(dir) {
                let error = JobError::DirectoryCreate {
                    path: dir.to_path_buf(),
                    source: err,
                };
                log!("error"; "{error}");
                return JobOutcome::failed(source, target, error);
            }
            debug!("dir"; "created new directory `{}`", dir.display());
        }

        if !source.exists() {
            let error = JobError::SourceMissing(source.clone());
            log!("warning"; "{error}");
            return JobOutcome::failed(source, target, error);
        }

        let mut issues = Vec::new();
        match transform(self.transformer, job, self.options) {
            Ok(report) => {
                issues.extend(report.warnings.into_iter().map(StageIssue::Option));
                log!("ok"; "{} ({}) created", target.display(), job.resolution);
            }
            Err(err) => {
                log!("error"; "{err}");
                issues.push(StageIssue::Transform(err));
                // Nothing worth optimizing was written.
                return JobOutcome::completed(source, target, issues);
            }
        }

        if job.optimize {
            match self.optimizer.optimize(target) {
                Ok(OptimizeOutcome::Optimized(tool)) => {
                    debug!("optimize"; "{} optimized with {}", target.display(), tool.program());
                }
                Ok(OptimizeOutcome::Skipped) => {}
                Err(err) => {
                    log!("error"; "{err}");
                    issues.push(StageIssue::Optimize(err));
                }
            }
        }

        JobOutcome::completed(source, target, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ImageSpec, OptimizeSettings, OptimizerSetting, Resolution, TransformerKind,
    };
    use crate::image::{
        TransformError, builtin::BuiltinTransformer, ops::TransformOp, optimize::OptimizerTool,
    };
    use crate::pipeline::outcome::JobStatus;
    use crate::resolve::{AliasTable, TagFilter, resolve_jobs, split_tags};
    use image::RgbaImage;
    use std::{
        cell::RefCell,
        path::{Path, PathBuf},
    };
    use tempfile::TempDir;

    /// Records the order it was called in; fails for sources named `bad.*`.
    #[derive(Default)]
    struct Recording {
        calls: RefCell<Vec<PathBuf>>,
    }

    impl Transformer for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn render(
            &self,
            job: &ResolvedJob,
            _ops: &[TransformOp],
        ) -> Result<Vec<String>, TransformError> {
            self.calls.borrow_mut().push(job.source_path.clone());
            if job.source_path.file_stem().is_some_and(|s| s == "bad") {
                return Err(TransformError::Tool {
                    tool: "recording".into(),
                    path: job.target_path.clone(),
                    message: "refused".into(),
                });
            }
            Ok(Vec::new())
        }
    }

    fn config(base: &Path, images: Vec<ImageSpec>) -> PipelineConfig {
        PipelineConfig {
            config_path: base.join("config.json"),
            base_path: base.to_path_buf(),
            aliases: AliasTable::default(),
            images,
            options: OptionMap::new(),
            optimize: OptimizeSettings::default(),
            transformer: TransformerKind::Builtin,
        }
    }

    fn spec(source: &str, target: &str, optimize: bool) -> ImageSpec {
        ImageSpec {
            source_path: source.to_string(),
            target_path: target.to_string(),
            tags: split_tags("all"),
            resolution: Resolution {
                width: 2,
                height: 2,
            },
            proportional: false,
            quality: None,
            options: OptionMap::new(),
            optimize,
        }
    }

    fn write_png(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::new(4, 4).save(path).unwrap();
    }

    fn labels(outcomes: &[JobOutcome]) -> Vec<&'static str> {
        outcomes.iter().map(|o| o.status.label()).collect()
    }

    #[test]
    fn test_failure_isolation_end_to_end() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        write_png(&base.join("img/a.png"));
        write_png(&base.join("img/b.png"));

        let config = config(
            base,
            vec![
                spec("img/missing.png", "out/missing.png", false),
                spec("img/a.png", "out/a.png", false),
                spec("img/b.png", "out/nested/b.png", false),
            ],
        );
        let plan = resolve_jobs(&config, &TagFilter::default());
        assert_eq!(plan.jobs.len(), 3);

        let outcomes = JobSequencer::new(&BuiltinTransformer, &config).run(&plan.jobs);

        assert_eq!(labels(&outcomes), vec!["source missing", "succeeded", "succeeded"]);
        assert!(matches!(
            outcomes[0].status,
            JobStatus::Failed(JobError::SourceMissing(_))
        ));
        assert!(!base.join("out/missing.png").exists());
        assert!(base.join("out/a.png").is_file());
        assert!(base.join("out/nested/b.png").is_file());
    }

    #[test]
    fn test_sequencing_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        for name in ["c", "bad", "a"] {
            write_png(&base.join(format!("img/{name}.png")));
        }
        let config = config(
            base,
            vec![
                spec("img/*.png", "out/*.png", false),
                spec("img/gone.png", "out/gone.png", false),
            ],
        );
        let jobs = resolve_jobs(&config, &TagFilter::default()).jobs;

        let first = Recording::default();
        let second = Recording::default();
        let first_outcomes = JobSequencer::new(&first, &config).run(&jobs);
        let second_outcomes = JobSequencer::new(&second, &config).run(&jobs);

        assert_eq!(*first.calls.borrow(), *second.calls.borrow());
        assert_eq!(labels(&first_outcomes), labels(&second_outcomes));
        assert_eq!(
            labels(&first_outcomes),
            vec!["succeeded", "degraded", "succeeded", "source missing"]
        );
    }

    #[test]
    fn test_transform_failure_skips_optimize() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        write_png(&base.join("img/bad.png"));
        let config = config(base, vec![spec("img/bad.png", "out/bad.png", true)]);
        let jobs = resolve_jobs(&config, &TagFilter::default()).jobs;

        // Would report ToolMissing if it ran.
        let optimizer = Optimizer::new(&config.optimize)
            .with_program(OptimizerTool::Optipng, "imgforge-no-such-optipng");
        let recording = Recording::default();
        let outcomes = JobSequencer::new(&recording, &config)
            .with_optimizer(optimizer)
            .run(&jobs);

        assert_eq!(outcomes[0].issues.len(), 1);
        assert!(matches!(outcomes[0].issues[0], StageIssue::Transform(_)));
    }

    #[test]
    fn test_optimizer_failure_degrades() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        write_png(&base.join("img/a.png"));
        let mut config = config(base, vec![spec("img/a.png", "out/a.png", true)]);
        config.optimize.jpgtran = OptimizerSetting::Disabled;
        let jobs = resolve_jobs(&config, &TagFilter::default()).jobs;

        let optimizer = Optimizer::new(&config.optimize)
            .with_program(OptimizerTool::Optipng, "imgforge-no-such-optipng");
        let outcomes = JobSequencer::new(&BuiltinTransformer, &config)
            .with_optimizer(optimizer)
            .run(&jobs);

        assert!(matches!(outcomes[0].status, JobStatus::Degraded));
        assert!(base.join("out/a.png").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_create_failure() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        write_png(&base.join("img/a.png"));
        // A file where the target directory should be.
        fs::write(base.join("out"), b"").unwrap();
        let config = config(base, vec![spec("img/a.png", "out/a.png", false)]);
        let jobs = resolve_jobs(&config, &TagFilter::default()).jobs;

        let outcomes = JobSequencer::new(&BuiltinTransformer, &config).run(&jobs);
        assert!(matches!(
            outcomes[0].status,
            JobStatus::Failed(JobError::DirectoryCreate { .. })
        ));
    }
}
