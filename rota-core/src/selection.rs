//! Reviewer selection policy
//!
//! Picks reviewers uniformly at random without replacement. The default
//! picker draws from the operating system's CSPRNG so that review load is
//! not skewed by a weak generator across many calls.

use rand::rngs::OsRng;
use rand::seq::index;

/// Chooses `n` distinct reviewers from a candidate pool
pub trait ReviewerPicker: Send + Sync {
    /// Returns at most `n` distinct candidates.
    ///
    /// - empty pool or `n == 0` -> empty
    /// - pool no larger than `n` -> the whole pool
    /// - otherwise exactly `n` candidates, sampled uniformly
    fn pick(&self, candidates: &[String], n: usize) -> Vec<String>;
}

/// Uniform sampling backed by [`OsRng`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureRandomPicker;

impl SecureRandomPicker {
    pub fn new() -> Self {
        Self
    }
}

impl ReviewerPicker for SecureRandomPicker {
    fn pick(&self, candidates: &[String], n: usize) -> Vec<String> {
        if n == 0 || candidates.is_empty() {
            return Vec::new();
        }
        if candidates.len() <= n {
            return candidates.to_vec();
        }

        index::sample(&mut OsRng, candidates.len(), n)
            .into_iter()
            .map(|i| candidates[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn pool(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_zero_or_empty_yields_nothing() {
        let picker = SecureRandomPicker::new();
        assert!(picker.pick(&pool(&["a", "b"]), 0).is_empty());
        assert!(picker.pick(&[], 2).is_empty());
    }

    #[test]
    fn test_small_pool_returned_whole() {
        let picker = SecureRandomPicker::new();
        assert_eq!(picker.pick(&pool(&["a"]), 2), pool(&["a"]));

        let picked: HashSet<_> = picker.pick(&pool(&["a", "b"]), 2).into_iter().collect();
        assert_eq!(picked, ["a", "b"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn test_exact_count_and_distinct() {
        let picker = SecureRandomPicker::new();
        let candidates = pool(&["a", "b", "c", "d", "e"]);

        for _ in 0..200 {
            let picked = picker.pick(&candidates, 2);
            assert_eq!(picked.len(), 2);
            assert_ne!(picked[0], picked[1]);
            assert!(picked.iter().all(|p| candidates.contains(p)));
        }
    }

    #[test]
    fn test_every_candidate_gets_picked() {
        let picker = SecureRandomPicker::new();
        let candidates = pool(&["a", "b", "c", "d"]);
        let mut hits: HashMap<String, usize> = HashMap::new();

        for _ in 0..2000 {
            for id in picker.pick(&candidates, 1) {
                *hits.entry(id).or_default() += 1;
            }
        }

        // Expected 500 each; a uniform sampler never comes near these bounds
        for id in &candidates {
            let count = hits.get(id).copied().unwrap_or(0);
            assert!(count > 300 && count < 700, "{} picked {} times", id, count);
        }
    }
}
