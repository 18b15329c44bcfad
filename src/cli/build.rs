//! Image building orchestration.
//!
//! Build phases:
//! - **Resolve** - Tag selection, alias fan-out, glob expansion, dedup
//! - **Plan** - With `--dry-run`, print the jobs and stop
//! - **Setup** - Create the transformer backend
//! - **Run** - Sequential job execution (transform, optimize)
//! - **Summary** - Counts per outcome; partial failure is not an error

use anyhow::{Context, Result};

use crate::{
    cli::Cli,
    config::PipelineConfig,
    image::create_transformer,
    log,
    pipeline::{JobSequencer, RunSummary},
    resolve::{ResolvedJob, TagFilter, resolve_jobs},
};

/// Build every image selected by the CLI tags.
///
/// Only setup problems (no usable transformer) are errors; individual job
/// failures end up in the returned summary.
pub fn build_images(config: &PipelineConfig, cli: &Cli) -> Result<RunSummary> {
    let filter = TagFilter::new(&cli.tags);
    log!("resolve"; "resolving image paths for tags `{filter}`");

    let plan = resolve_jobs(config, &filter);
    let idle = RunSummary {
        spec_errors: plan.spec_errors.len(),
        ..RunSummary::default()
    };

    if plan.jobs.is_empty() {
        if idle.spec_errors > 0 {
            idle.print();
        } else {
            log!("info"; "no images matching the tags `{filter}` found");
        }
        return Ok(idle);
    }

    if cli.dry_run {
        print_plan(config, &plan.jobs);
        return Ok(idle);
    }

    let transformer =
        create_transformer(config.transformer).context("Failed to set up the image transformer")?;
    log!(
        "build";
        "{} job(s) from {} spec(s), using {}",
        plan.jobs.len(),
        plan.selected,
        transformer.name()
    );

    let outcomes = JobSequencer::new(transformer.as_ref(), config)
        .with_progress(!cli.verbose)
        .run(&plan.jobs);

    let summary = RunSummary::from_outcomes(&outcomes, plan.spec_errors.len());
    RunSummary::print_problems(&outcomes);
    summary.print();
    Ok(summary)
}

/// Print the resolved jobs without touching the filesystem.
fn print_plan(config: &PipelineConfig, jobs: &[ResolvedJob]) {
    let base = &config.base_path;
    log!(
        "plan";
        "jobs from `{}`, relative to `{}`",
        config.config_path.display(),
        base.display()
    );
    for job in jobs {
        let source = job.source_path.strip_prefix(base).unwrap_or(&job.source_path);
        let target = job.target_path.strip_prefix(base).unwrap_or(&job.target_path);
        let fit = if job.proportional { "" } else { "!" };
        log!(
            "plan";
            "{} -> {} ({}{fit})",
            source.display(),
            target.display(),
            job.resolution
        );
    }
    log!("plan"; "{} job(s), nothing written (dry run)", jobs.len());
}
