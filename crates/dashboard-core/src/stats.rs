//! Descriptive statistics and extremum helpers shared by the report builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── DescriptiveStats ──────────────────────────────────────────────────────────

/// Max / min / mean / sample standard deviation of a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    /// Sample (n − 1) standard deviation; `None` with fewer than two values.
    pub std_dev: Option<f64>,
}

impl DescriptiveStats {
    /// Describe `values`, returning `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = values.iter().sum::<f64>() / count as f64;

        let std_dev = if count < 2 {
            None
        } else {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            Some((sum_sq / (count as f64 - 1.0)).sqrt())
        };

        Some(Self {
            count,
            max,
            min,
            mean,
            std_dev,
        })
    }
}

// ── Extremum ──────────────────────────────────────────────────────────────────

/// A group key paired with its aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extremum<K> {
    pub key: K,
    pub value: f64,
}

/// First entry holding the largest value; earlier entries win ties.
pub fn first_max<K: Clone>(entries: &[(K, f64)]) -> Option<Extremum<K>> {
    first_by(entries, |candidate, best| candidate > best)
}

/// First entry holding the smallest value; earlier entries win ties.
pub fn first_min<K: Clone>(entries: &[(K, f64)]) -> Option<Extremum<K>> {
    first_by(entries, |candidate, best| candidate < best)
}

fn first_by<K: Clone>(
    entries: &[(K, f64)],
    better: impl Fn(f64, f64) -> bool,
) -> Option<Extremum<K>> {
    let mut best: Option<&(K, f64)> = None;
    for entry in entries {
        match best {
            Some(current) if !better(entry.1, current.1) => {}
            _ => best = Some(entry),
        }
    }
    best.map(|(key, value)| Extremum {
        key: key.clone(),
        value: *value,
    })
}

// ── Mode ──────────────────────────────────────────────────────────────────────

/// Most frequent value; among equally frequent values the smallest wins.
///
/// ```
/// use dashboard_core::stats::mode_smallest;
///
/// assert_eq!(mode_smallest([5, 3, 5, 3]), Some(3));
/// assert_eq!(mode_smallest([7, 7, 2]), Some(7));
/// assert_eq!(mode_smallest(Vec::<u32>::new()), None);
/// ```
pub fn mode_smallest(values: impl IntoIterator<Item = u32>) -> Option<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }

    // BTreeMap iterates ascending, so a strict `>` keeps the smallest on ties.
    let mut best: Option<(u32, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_empty_is_none() {
        assert!(DescriptiveStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_describe_single_value_has_no_std_dev() {
        let s = DescriptiveStats::from_values(&[4.0]).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.min, 4.0);
        assert_eq!(s.mean, 4.0);
        assert!(s.std_dev.is_none());
    }

    #[test]
    fn test_describe_sample_std_dev() {
        let s = DescriptiveStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.max, 9.0);
        assert_eq!(s.min, 2.0);
        assert!((s.mean - 5.0).abs() < 1e-12);
        // Sum of squared deviations is 32; 32 / 7 under the sample estimator.
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((s.std_dev.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_first_max_prefers_earliest_on_tie() {
        let entries = vec![("2022", 10.0), ("2023", 30.0), ("2024", 30.0)];
        let max = first_max(&entries).unwrap();
        assert_eq!(max.key, "2023");
        assert_eq!(max.value, 30.0);
    }

    #[test]
    fn test_first_min_prefers_earliest_on_tie() {
        let entries = vec![(3u32, 5.0), (1, 2.0), (7, 2.0)];
        let min = first_min(&entries).unwrap();
        assert_eq!(min.key, 1);
        assert_eq!(min.value, 2.0);
    }

    #[test]
    fn test_extrema_of_empty_are_none() {
        let entries: Vec<(String, f64)> = Vec::new();
        assert!(first_max(&entries).is_none());
        assert!(first_min(&entries).is_none());
    }

    #[test]
    fn test_mode_smallest_on_tie() {
        assert_eq!(mode_smallest([18, 9, 18, 9, 23]), Some(9));
    }

    #[test]
    fn test_mode_clear_winner() {
        assert_eq!(mode_smallest([1, 20, 20, 20, 1]), Some(20));
    }
}
