//! End-of-run summary.

use super::outcome::{JobError, JobOutcome, JobStatus};
use crate::log;

/// Counts per outcome class for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub degraded: usize,
    pub missing: usize,
    pub failed: usize,
    /// Specs whose pattern could not be expanded.
    pub spec_errors: usize,
    /// Option warnings across all jobs.
    pub warnings: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[JobOutcome], spec_errors: usize) -> Self {
        let mut summary = Self {
            spec_errors,
            ..Self::default()
        };
        for outcome in outcomes {
            match &outcome.status {
                JobStatus::Succeeded => summary.succeeded += 1,
                JobStatus::Degraded => summary.degraded += 1,
                JobStatus::Failed(JobError::SourceMissing(_)) => summary.missing += 1,
                JobStatus::Failed(JobError::DirectoryCreate { .. }) => summary.failed += 1,
            }
            summary.warnings += outcome
                .issues
                .iter()
                .filter(|issue| !issue.is_failure())
                .count();
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.degraded + self.missing + self.failed
    }

    /// Whether anything went wrong. Never affects the exit status.
    pub fn has_problems(&self) -> bool {
        self.degraded + self.missing + self.failed + self.spec_errors > 0
    }

    /// One-line report, e.g. `4 images: 3 created, 1 source missing`.
    pub fn line(&self) -> String {
        let mut parts = vec![format!("{} created", self.succeeded)];
        if self.degraded > 0 {
            parts.push(format!("{} with errors", self.degraded));
        }
        if self.missing > 0 {
            parts.push(format!("{} source missing", self.missing));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        if self.warnings > 0 {
            parts.push(plural_count(self.warnings, "warning"));
        }
        if self.spec_errors > 0 {
            parts.push(plural_count(self.spec_errors, "invalid pattern"));
        }
        format!("{}: {}", plural_count(self.total(), "image"), parts.join(", "))
    }

    pub fn print(&self) {
        let prefix = if self.has_problems() { "warning" } else { "ok" };
        log!(prefix; "{}", self.line());
    }

    /// Recap every job that did not succeed, in run order.
    pub fn print_problems(outcomes: &[JobOutcome]) {
        for line in outcomes.iter().filter_map(JobOutcome::describe) {
            log!("error"; "{line}");
        }
    }
}

/// `1 image`, `3 images`.
fn plural_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
