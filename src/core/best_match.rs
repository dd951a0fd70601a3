use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, SearchError};

/// Best-so-far accumulator: the smallest squared distance seen and the
/// 0-based offset of the window that produced it.
///
/// Owned by whoever drives a scan. Independent scans (e.g. shards) each keep
/// their own and are combined with [`merge`](Self::merge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    squared: f64,
    offset: Option<usize>,
}

impl BestMatch {
    /// An empty accumulator: infinite distance, no location.
    pub fn new() -> Self {
        Self {
            squared: f64::INFINITY,
            offset: None,
        }
    }

    /// Best squared distance so far (the early-abandoning bound).
    #[inline]
    pub fn squared(&self) -> f64 {
        self.squared
    }

    /// 0-based offset of the best window, if any window has been accepted.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// 1-based location of the best window.
    pub fn location(&self) -> Option<usize> {
        self.offset.map(|o| o + 1)
    }

    /// Euclidean (non-squared) best distance.
    pub fn distance(&self) -> f64 {
        self.squared.sqrt()
    }

    /// Record `squared` for the window at `offset` if it is strictly better.
    ///
    /// Returns whether the best match changed. Ties keep the earlier window.
    #[inline]
    pub fn update(&mut self, offset: usize, squared: f64) -> bool {
        if squared < self.squared {
            self.squared = squared;
            self.offset = Some(offset);
            true
        } else {
            false
        }
    }

    /// Fold another accumulator into this one.
    ///
    /// Equal distances resolve to the smaller offset, so merging shard results
    /// agrees with a single left-to-right scan.
    pub fn merge(&mut self, other: &BestMatch) {
        let Some(other_offset) = other.offset else {
            return;
        };
        let better = match self.offset {
            None => true,
            Some(offset) => {
                other.squared < self.squared
                    || (other.squared == self.squared && other_offset < offset)
            }
        };
        if better {
            *self = *other;
        }
    }

    /// The same match with its offset moved by `by` positions.
    pub fn shifted(self, by: usize) -> Self {
        Self {
            squared: self.squared,
            offset: self.offset.map(|o| o + by),
        }
    }
}

impl Default for BestMatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of scoring one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowScore {
    /// Full squared distance, or a partial sum already `>=` the bound.
    pub squared: f64,
    /// Number of query elements compared before stopping.
    pub compared: usize,
}

/// Work done by a scan, for pruning diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanCounters {
    /// Reference values read from the source.
    pub points_scanned: usize,
    /// Windows scored.
    pub windows: usize,
    /// Windows whose accumulation stopped before all m elements.
    pub abandoned: usize,
    /// Total query/window element comparisons.
    pub values_compared: usize,
}

impl ScanCounters {
    #[inline]
    pub(crate) fn record(&mut self, score: WindowScore, m: usize) {
        self.windows += 1;
        self.values_compared += score.compared;
        if score.compared < m {
            self.abandoned += 1;
        }
    }

    pub fn merge(&mut self, other: &ScanCounters) {
        self.points_scanned += other.points_scanned;
        self.windows += other.windows;
        self.abandoned += other.abandoned;
        self.values_compared += other.values_compared;
    }

    /// Fraction of windows pruned by early abandoning.
    pub fn abandon_rate(&self) -> f64 {
        if self.windows == 0 {
            0.0
        } else {
            self.abandoned as f64 / self.windows as f64
        }
    }
}

/// Final answer of a search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// 1-based start of the best-matching window in the reference series.
    pub location: usize,
    /// Euclidean distance between the normalized window and query.
    pub distance: f64,
    /// Query length m.
    pub query_len: usize,
    /// Work counters.
    pub counters: ScanCounters,
    /// Wall-clock time of the scan.
    pub elapsed: Duration,
}

impl SearchResult {
    /// Build the result of a finished scan.
    ///
    /// # Errors
    /// `NoMatch` if `best` never accepted a window.
    pub fn from_parts(
        best: &BestMatch,
        counters: ScanCounters,
        query_len: usize,
        elapsed: Duration,
    ) -> Result<Self> {
        let location = best.location().ok_or(SearchError::NoMatch {
            series_len: counters.points_scanned,
            query_len,
        })?;
        Ok(Self {
            location,
            distance: best.distance(),
            query_len,
            counters,
            elapsed,
        })
    }

    /// 0-based start of the best-matching window.
    pub fn offset(&self) -> usize {
        self.location - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_strictly_better() {
        let mut best = BestMatch::new();
        assert!(best.offset().is_none());
        assert!(best.update(4, 2.0));
        assert!(!best.update(7, 2.0), "ties keep the earlier window");
        assert!(!best.update(8, 3.0));
        assert!(best.update(9, 1.0));
        assert_eq!(best.offset(), Some(9));
        assert_eq!(best.location(), Some(10));
        assert!((best.distance() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_ignores_nan() {
        let mut best = BestMatch::new();
        assert!(!best.update(0, f64::NAN));
        assert!(best.offset().is_none());
    }

    #[test]
    fn test_merge_prefers_smaller_distance_then_offset() {
        let mut a = BestMatch::new();
        a.update(10, 4.0);

        let mut b = BestMatch::new();
        b.update(3, 4.0);
        let mut merged = a;
        merged.merge(&b);
        assert_eq!(merged.offset(), Some(3));

        let mut c = BestMatch::new();
        c.update(50, 1.0);
        merged.merge(&c);
        assert_eq!(merged.offset(), Some(50));

        merged.merge(&BestMatch::new());
        assert_eq!(merged.offset(), Some(50));
    }

    #[test]
    fn test_merge_into_empty() {
        let mut empty = BestMatch::new();
        let mut other = BestMatch::new();
        other.update(2, 0.5);
        empty.merge(&other);
        assert_eq!(empty, other);
    }

    #[test]
    fn test_shifted() {
        let mut best = BestMatch::new();
        best.update(5, 1.5);
        let moved = best.shifted(100);
        assert_eq!(moved.offset(), Some(105));
        assert_eq!(moved.squared(), 1.5);
        assert_eq!(BestMatch::new().shifted(3).offset(), None);
    }

    #[test]
    fn test_counters_record_and_merge() {
        let mut counters = ScanCounters::default();
        counters.record(WindowScore { squared: 9.0, compared: 2 }, 8);
        counters.record(WindowScore { squared: 1.0, compared: 8 }, 8);
        assert_eq!(counters.windows, 2);
        assert_eq!(counters.abandoned, 1);
        assert_eq!(counters.values_compared, 10);
        assert!((counters.abandon_rate() - 0.5).abs() < 1e-12);

        let mut total = ScanCounters::default();
        total.merge(&counters);
        total.merge(&counters);
        assert_eq!(total.windows, 4);
        assert_eq!(total.abandoned, 2);
    }

    #[test]
    fn test_result_requires_a_match() {
        let counters = ScanCounters {
            points_scanned: 2,
            ..Default::default()
        };
        let err = SearchResult::from_parts(&BestMatch::new(), counters, 3, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::NoMatch {
                series_len: 2,
                query_len: 3
            }
        ));
    }

    #[test]
    fn test_result_location_is_one_based() {
        let mut best = BestMatch::new();
        best.update(2, 0.25);
        let result =
            SearchResult::from_parts(&best, ScanCounters::default(), 3, Duration::ZERO).unwrap();
        assert_eq!(result.location, 3);
        assert_eq!(result.offset(), 2);
        assert!((result.distance - 0.5).abs() < 1e-12);
    }
}
