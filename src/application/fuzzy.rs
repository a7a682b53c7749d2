//! # Fuzzy Matching
//!
//! Typo-tolerant substring search used for free-text quote lookups.
//!
//! Scoring follows the Bitap convention: a candidate position costs
//! `errors / pattern_len + |start - location| / distance`, so a perfect match at the
//! expected location scores 0.0 and anything above `threshold` is rejected.
//! Patterns longer than `max_pattern_length` switch to a plain token search.

use crate::domain::config::SearchConfig;

#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    threshold: f64,
    location: usize,
    distance: usize,
    max_pattern_length: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl FuzzyMatcher {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            threshold: config.threshold,
            location: config.location,
            distance: config.distance,
            max_pattern_length: config.max_pattern_length,
        }
    }

    /// Whether `text` contains something close enough to `pattern`.
    pub fn matches(&self, pattern: &str, text: &str) -> bool {
        let pattern = pattern.trim().to_lowercase();
        if pattern.is_empty() {
            return false;
        }
        let text = text.to_lowercase();

        if pattern.chars().count() > self.max_pattern_length {
            return token_match(&pattern, &text);
        }
        self.score(&pattern, &text) <= self.threshold
    }

    /// Best score of `pattern` anywhere in `text` (both already lowercased).
    fn score(&self, pattern: &str, text: &str) -> f64 {
        let pattern: Vec<char> = pattern.chars().collect();
        let text: Vec<char> = text.chars().collect();
        let m = pattern.len();

        // Sellers' edit distance: row 0 is free so a match may begin anywhere.
        // `start` tracks where the cheapest alignment for each cell began.
        let mut cost: Vec<usize> = (0..=m).collect();
        let mut start: Vec<usize> = vec![0; m + 1];
        let mut best = self.position_score(cost[m], m, 0);

        for (j, &tc) in text.iter().enumerate() {
            let mut next_cost = vec![0; m + 1];
            let mut next_start = vec![j + 1; m + 1];

            for i in 1..=m {
                let substitute = cost[i - 1] + usize::from(pattern[i - 1] != tc);
                let skip_text = cost[i] + 1;
                let skip_pattern = next_cost[i - 1] + 1;

                if substitute <= skip_text && substitute <= skip_pattern {
                    next_cost[i] = substitute;
                    next_start[i] = if i == 1 { j } else { start[i - 1] };
                } else if skip_text <= skip_pattern {
                    next_cost[i] = skip_text;
                    next_start[i] = start[i];
                } else {
                    next_cost[i] = skip_pattern;
                    next_start[i] = next_start[i - 1];
                }
            }

            cost = next_cost;
            start = next_start;
            best = best.min(self.position_score(cost[m], m, start[m]));
            if best == 0.0 {
                break;
            }
        }
        best
    }

    fn position_score(&self, errors: usize, pattern_len: usize, start: usize) -> f64 {
        let accuracy = errors as f64 / pattern_len as f64;
        let proximity = start.abs_diff(self.location);
        if self.distance == 0 {
            return if proximity == 0 { accuracy } else { 1.0 };
        }
        accuracy + proximity as f64 / self.distance as f64
    }
}

/// Literal search for any whitespace-separated token of `pattern`.
fn token_match(pattern: &str, text: &str) -> bool {
    pattern
        .split_whitespace()
        .any(|token| text.contains(token))
}
