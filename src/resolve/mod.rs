//! Job resolution: from image specs to an ordered list of concrete jobs.
//!
//! # Pipeline
//!
//! ```text
//! PipelineConfig.images
//!        │ TagFilter::select
//!        ▼
//! per spec: expand_spec (aliases, basePath, glob) ──► dedup_by_basename
//!        │
//!        ▼ concatenated in config order
//! JobPlan.jobs
//! ```
//!
//! | Module   | Purpose                                         |
//! |----------|-------------------------------------------------|
//! | `alias`  | Alias table preparation and substitution        |
//! | `tags`   | Tag-based spec selection                        |
//! | `expand` | Glob fan-out and wildcard targets               |
//! | `dedup`  | Last-wins deduplication by source file name     |
//! | `job`    | `ResolvedJob`                                   |

mod alias;
mod dedup;
mod expand;
mod job;
mod tags;

pub use alias::{Alias, AliasTable};
pub use dedup::dedup_by_basename;
pub use expand::{ExpandError, expand_spec};
pub use job::ResolvedJob;
pub use tags::{TagFilter, split_tags};

use crate::{config::PipelineConfig, debug, log};

/// Result of resolving every selected spec.
#[derive(Debug, Default)]
pub struct JobPlan {
    /// Jobs in execution order.
    pub jobs: Vec<ResolvedJob>,
    /// Number of specs that passed the tag filter.
    pub selected: usize,
    /// Specs whose pattern could not be expanded; they contribute no jobs.
    pub spec_errors: Vec<ExpandError>,
}

/// Resolve every spec selected by `filter` into jobs.
///
/// A spec that fails to expand is logged and skipped; the others still
/// contribute their jobs.
pub fn resolve_jobs(config: &PipelineConfig, filter: &TagFilter) -> JobPlan {
    let mut plan = JobPlan::default();

    for spec in filter.select(&config.images) {
        plan.selected += 1;
        match expand_spec(spec, &config.aliases, &config.base_path) {
            Ok(jobs) => {
                let jobs = dedup_by_basename(jobs);
                debug!("resolve"; "{} -> {} job(s)", spec.source_path, jobs.len());
                plan.jobs.extend(jobs);
            }
            Err(err) => {
                log!("error"; "{err}");
                plan.spec_errors.push(err);
            }
        }
    }

    plan
}
