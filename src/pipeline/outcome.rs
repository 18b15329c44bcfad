//! Per-job results.

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::image::{OptimizeError, TransformError};

/// A failure that stopped a job before anything was written.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("source image `{}` does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("could not create target directory `{}`", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Something a stage reported without stopping the job.
#[derive(Debug, Error)]
pub enum StageIssue {
    /// An option was skipped (unknown, malformed, or unsupported).
    #[error("{0}")]
    Option(String),
    #[error(transparent)]
    Transform(TransformError),
    #[error(transparent)]
    Optimize(OptimizeError),
}

impl StageIssue {
    /// Stage failures degrade a job; option warnings do not.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Option(_))
    }
}

#[derive(Debug)]
pub enum JobStatus {
    /// Every stage ran cleanly.
    Succeeded,
    /// The transform or optimizer failed; the failure was logged and the
    /// job still ran to completion.
    Degraded,
    Failed(JobError),
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Degraded => "degraded",
            Self::Failed(JobError::SourceMissing(_)) => "source missing",
            Self::Failed(JobError::DirectoryCreate { .. }) => "failed",
        }
    }
}

/// Outcome of one job, in execution order.
#[derive(Debug)]
pub struct JobOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub status: JobStatus,
    pub issues: Vec<StageIssue>,
}

impl JobOutcome {
    /// Outcome of a job that ran every stage it reached.
    pub fn completed(source: &Path, target: &Path, issues: Vec<StageIssue>) -> Self {
        let status = if issues.iter().any(StageIssue::is_failure) {
            JobStatus::Degraded
        } else {
            JobStatus::Succeeded
        };
        Self {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            status,
            issues,
        }
    }

    pub fn failed(source: &Path, target: &Path, error: JobError) -> Self {
        Self {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            status: JobStatus::Failed(error),
            issues: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded)
    }

    /// `source -> target: <status> (<reasons>)` for a job that did not
    /// succeed, `None` otherwise. Option warnings are not reasons.
    pub fn describe(&self) -> Option<String> {
        if self.is_success() {
            return None;
        }
        let reasons: Vec<String> = match &self.status {
            JobStatus::Failed(err) => vec![err.to_string()],
            _ => self
                .issues
                .iter()
                .filter(|issue| issue.is_failure())
                .map(ToString::to_string)
                .collect(),
        };
        Some(format!(
            "{} -> {}: {} ({})",
            self.source.display(),
            self.target.display(),
            self.status.label(),
            reasons.join("; ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_warnings_do_not_degrade() {
        let outcome = JobOutcome::completed(
            Path::new("a.png"),
            Path::new("b.png"),
            vec![StageIssue::Option("unknown option `sepia`".into())],
        );
        assert!(outcome.is_success());
        assert_eq!(outcome.issues.len(), 1);
    }

    #[test]
    fn test_stage_failure_degrades() {
        let outcome = JobOutcome::completed(
            Path::new("a.png"),
            Path::new("b.png"),
            vec![StageIssue::Optimize(OptimizeError::ToolMissing("optipng".into()))],
        );
        assert!(matches!(outcome.status, JobStatus::Degraded));
        assert_eq!(outcome.status.label(), "degraded");
    }

    #[test]
    fn test_describe_names_job_and_reasons() {
        let clean = JobOutcome::completed(
            Path::new("a.png"),
            Path::new("b.png"),
            vec![StageIssue::Option("unknown option `sepia`".into())],
        );
        assert_eq!(clean.describe(), None);

        let missing = JobOutcome::failed(
            Path::new("img/a.png"),
            Path::new("out/a.png"),
            JobError::SourceMissing(PathBuf::from("img/a.png")),
        );
        assert_eq!(
            missing.describe().unwrap(),
            "img/a.png -> out/a.png: source missing (source image `img/a.png` does not exist)"
        );

        let degraded = JobOutcome::completed(
            Path::new("img/a.png"),
            Path::new("out/a.png"),
            vec![
                StageIssue::Option("unknown option `sepia`".into()),
                StageIssue::Optimize(OptimizeError::ToolMissing("optipng".into())),
            ],
        );
        assert_eq!(
            degraded.describe().unwrap(),
            "img/a.png -> out/a.png: degraded (`optipng` command not found)"
        );
    }
}
