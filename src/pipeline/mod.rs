//! Job execution.
//!
//! - [`sequencer`]: runs resolved jobs one at a time, isolating failures
//! - [`outcome`]: per-job status and stage issues
//! - [`summary`]: end-of-run counts

pub mod outcome;
pub mod sequencer;
pub mod summary;

pub use sequencer::JobSequencer;
pub use summary::RunSummary;
