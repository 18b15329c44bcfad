//! Per-spec deduplication.
//!
//! When alias variants point at several directories holding the same file
//! name, only one job per source file name survives: the *last* one
//! produced, kept at the position of its last occurrence.
//!
//! ```text
//! [A(1), B(2), A(3)]  ->  [B(2), A(3)]
//! ```

use std::hash::Hash;

use rustc_hash::FxHashSet;

use super::ResolvedJob;

/// Collapse jobs sharing a source file name, last one wins.
pub fn dedup_by_basename(jobs: Vec<ResolvedJob>) -> Vec<ResolvedJob> {
    dedup_last_by(jobs, ResolvedJob::source_key)
}

/// Keep the last item per key, ordered by each survivor's position.
fn dedup_last_by<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    let mut seen = FxHashSet::default();
    let mut kept: Vec<T> = items
        .into_iter()
        .rev()
        .filter(|item| seen.insert(key(item)))
        .collect();
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionMap, Resolution};
    use std::path::PathBuf;

    fn job(source: &str, width: u32) -> ResolvedJob {
        ResolvedJob {
            source_path: PathBuf::from(source),
            target_path: PathBuf::from("out.png"),
            resolution: Resolution { width, height: 1 },
            proportional: false,
            quality: None,
            options: OptionMap::new(),
            optimize: true,
        }
    }

    #[test]
    fn test_last_wins_in_last_position() {
        let jobs = vec![job("a/A.png", 1), job("a/B.png", 2), job("b/A.png", 3)];
        let kept: Vec<_> = dedup_by_basename(jobs)
            .into_iter()
            .map(|j| (j.source_path, j.resolution.width))
            .collect();

        assert_eq!(
            kept,
            vec![(PathBuf::from("a/B.png"), 2), (PathBuf::from("b/A.png"), 3)]
        );
    }

    #[test]
    fn test_distinct_keys_untouched() {
        let jobs = vec![job("x/1.png", 1), job("x/2.png", 2), job("x/3.png", 3)];
        assert_eq!(dedup_by_basename(jobs.clone()), jobs);
    }

    #[test]
    fn test_generic_keys() {
        let items = vec![("A", 1), ("B", 2), ("A", 3), ("C", 4), ("B", 5)];
        assert_eq!(
            dedup_last_by(items, |(k, _)| *k),
            vec![("A", 3), ("C", 4), ("B", 5)]
        );
    }
}
