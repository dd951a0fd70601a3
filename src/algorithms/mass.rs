use crate::algorithms::common::sliding_dot_product;
use crate::core::best_match::BestMatch;
use crate::core::query::PreparedQuery;
use crate::core::stats::RollingStats;
use crate::error::{Result, SearchError};

/// Compute the z-normalized distance profile of `query` against `ts`.
///
/// Implements MASS (Mueen's Algorithm for Similarity Search):
/// 1. Compute rolling statistics (mean, std) for the time series
/// 2. Compute the sliding dot product between query and time series
/// 3. Convert QT values to z-normalized Euclidean distances
///
/// The whole series must be in memory. This is the batch counterpart of the
/// streaming scan and serves as an independent check on it: the arithmetic
/// shares nothing with the incremental statistics or early abandoning.
///
/// A constant window is treated as normalizing to all zeros, so its distance
/// is `sqrt(m)`, matching the streaming evaluators.
///
/// # Returns
/// A distance profile of length `ts.len() - query.len() + 1`.
///
/// # Errors
/// - `InvalidInput` / `DomainError` for an unusable query
/// - `NoMatch` if `ts` is shorter than the query
pub fn mass(query: &[f64], ts: &[f64]) -> Result<Vec<f64>> {
    let prepared = PreparedQuery::new(query)?;
    let m = query.len();
    if ts.len() < m {
        return Err(SearchError::NoMatch {
            series_len: ts.len(),
            query_len: m,
        });
    }

    let stats = RollingStats::compute(ts, m);
    let qt = sliding_dot_product(query, ts)?;

    let m_f = m as f64;
    let mu_q = prepared.mean();
    let sigma_q = prepared.std();
    let constant_distance = m_f.sqrt();

    let profile = qt
        .iter()
        .enumerate()
        .map(|(i, &qt_i)| {
            if stats.is_constant(i) {
                return constant_distance;
            }
            let r = (qt_i - m_f * mu_q * stats.mean[i]) / (m_f * sigma_q * stats.std[i]);
            let r_clamped = r.clamp(-1.0, 1.0);
            (2.0 * m_f * (1.0 - r_clamped)).max(0.0).sqrt()
        })
        .collect();

    Ok(profile)
}

/// Best match of `query` in `ts` from the MASS distance profile.
///
/// Ties resolve to the earliest window.
pub fn best_match_mass(query: &[f64], ts: &[f64]) -> Result<BestMatch> {
    let profile = mass(query, ts)?;
    let mut best = BestMatch::new();
    for (i, d) in profile.iter().enumerate() {
        best.update(i, d * d);
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_self_match() {
        let ts: Vec<f64> = (0..200)
            .map(|i| (i as f64 * 2.0 * std::f64::consts::PI / 50.0).sin())
            .collect();
        let query = &ts[50..80];

        let dp = mass(query, &ts).unwrap();
        assert_eq!(dp.len(), ts.len() - 30 + 1);
        assert!(
            dp[50] < 1e-6,
            "Self-match distance should be ~0, got {}",
            dp[50]
        );
    }

    #[test]
    fn test_mass_constant_windows() {
        let mut ts = vec![3.0; 20];
        ts.extend((0..20).map(|i| (i as f64 * 0.4).sin()));
        let query = [1.0, 4.0, 2.0, 8.0];

        let dp = mass(&query, &ts).unwrap();
        let expected = 2.0_f64;
        for (i, &d) in dp.iter().take(17).enumerate() {
            assert!(
                (d - expected).abs() < 1e-12,
                "constant window {i}: expected sqrt(m)={expected}, got {d}"
            );
        }
    }

    #[test]
    fn test_mass_distances_non_negative() {
        let ts: Vec<f64> = (0..300)
            .map(|i| (i as f64 * 0.1).sin() + (i as f64 * 0.03).cos())
            .collect();
        let query = &ts[10..30];
        let dp = mass(query, &ts).unwrap();
        for (i, &d) in dp.iter().enumerate() {
            assert!(d >= 0.0, "Distance at {i} is negative: {d}");
        }
    }

    #[test]
    fn test_mass_rejects_constant_query() {
        let ts: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let err = mass(&[2.0; 5], &ts).unwrap_err();
        assert!(matches!(err, SearchError::DomainError { .. }));
    }

    #[test]
    fn test_mass_short_series() {
        let err = mass(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, SearchError::NoMatch { .. }));
    }

    #[test]
    fn test_best_match_mass_concrete() {
        let best = best_match_mass(&[0.0, 1.0, 0.0], &[5.0, 5.0, 0.0, 1.0, 0.0, 5.0, 5.0]).unwrap();
        assert_eq!(best.location(), Some(3));
        assert!(best.distance() < 1e-6);
    }
}
