use crate::core::best_match::BestMatch;
use crate::core::query::PreparedQuery;
use crate::core::stats::{is_constant, mean_std};
use crate::error::{Result, SearchError};

/// Squared z-normalized distance between `query` and `window`, both raw.
///
/// Two-pass statistics, natural order, no early exit.
pub fn squared_distance(query: &[f64], window: &[f64]) -> Result<f64> {
    let prepared = PreparedQuery::new(query)?;
    if window.len() != query.len() {
        return Err(SearchError::invalid(format!(
            "window has {} values, query has {}",
            window.len(),
            query.len()
        )));
    }
    Ok(squared_distance_normalized(&prepared.normalized(), window))
}

fn squared_distance_normalized(normalized_query: &[f64], window: &[f64]) -> f64 {
    let (mean, std) = mean_std(window);
    if is_constant(mean, std) {
        return normalized_query.iter().map(|q| q * q).sum();
    }
    normalized_query
        .iter()
        .zip(window)
        .map(|(q, x)| {
            let diff = (x - mean) / std - q;
            diff * diff
        })
        .sum()
}

/// Reference best-match search over an in-memory series.
///
/// Recomputes every window's statistics from scratch and compares all m
/// elements in natural order. O(n * m); intended as a baseline for the
/// streaming scan, which must find the same answer.
pub fn best_match_brute_force(query: &[f64], ts: &[f64]) -> Result<BestMatch> {
    let prepared = PreparedQuery::new(query)?;
    let m = prepared.len();
    if ts.len() < m {
        return Err(SearchError::NoMatch {
            series_len: ts.len(),
            query_len: m,
        });
    }

    let normalized = prepared.normalized();
    let mut best = BestMatch::new();
    for (i, window) in ts.windows(m).enumerate() {
        best.update(i, squared_distance_normalized(&normalized, window));
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_scenario() {
        let best =
            best_match_brute_force(&[0.0, 1.0, 0.0], &[5.0, 5.0, 0.0, 1.0, 0.0, 5.0, 5.0]).unwrap();
        assert_eq!(best.location(), Some(3));
        assert!(best.distance() < 1e-12);
    }

    #[test]
    fn test_squared_distance_hand_computed() {
        // [-1, 1] vs [1, -1]
        let d = squared_distance(&[1.0, 2.0], &[4.0, 3.0]).unwrap();
        assert!((d - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_squared_distance_length_mismatch() {
        assert!(squared_distance(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_short_series() {
        let err = best_match_brute_force(&[1.0, 2.0, 3.0], &[1.0]).unwrap_err();
        assert!(matches!(err, SearchError::NoMatch { .. }));
    }
}
