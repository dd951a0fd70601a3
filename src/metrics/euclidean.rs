use crate::core::best_match::WindowScore;
use crate::core::distance_metric::WindowDistance;
use crate::core::query::PreparedQuery;
use crate::core::stats::is_constant;

/// Z-normalized squared Euclidean distance with early abandoning.
///
/// Elements are visited in the query's evaluation order. As soon as the
/// running sum reaches the best-so-far bound the window is rejected and the
/// partial sum is returned as a lower bound.
///
/// Edge cases:
/// - A constant window (see [`is_constant`]) normalizes to all zeros, giving a
///   squared distance of `query.norm_sq()` (m, up to rounding)
#[derive(Debug, Clone)]
pub struct EarlyAbandon;

/// Z-normalized squared Euclidean distance, always over all m elements.
///
/// Same arithmetic and visiting order as [`EarlyAbandon`], so any window the
/// early-abandoning variant completes gets a bit-identical score here.
#[derive(Debug, Clone)]
pub struct Exhaustive;

impl WindowDistance for EarlyAbandon {
    #[inline]
    fn score(
        query: &PreparedQuery,
        window: &[f64],
        mean: f64,
        std: f64,
        bsf: f64,
    ) -> WindowScore {
        let m = query.len();
        debug_assert_eq!(window.len(), m);
        if is_constant(mean, std) {
            return WindowScore {
                squared: query.norm_sq(),
                compared: m,
            };
        }

        let mut sum = 0.0;
        for (i, (&q, &pos)) in query.values().iter().zip(query.order()).enumerate() {
            let x = (window[pos] - mean) / std;
            let diff = x - q;
            sum += diff * diff;
            if sum >= bsf {
                return WindowScore {
                    squared: sum,
                    compared: i + 1,
                };
            }
        }
        WindowScore {
            squared: sum,
            compared: m,
        }
    }
}

impl WindowDistance for Exhaustive {
    #[inline]
    fn score(
        query: &PreparedQuery,
        window: &[f64],
        mean: f64,
        std: f64,
        _bsf: f64,
    ) -> WindowScore {
        let m = query.len();
        debug_assert_eq!(window.len(), m);
        if is_constant(mean, std) {
            return WindowScore {
                squared: query.norm_sq(),
                compared: m,
            };
        }

        let squared = query
            .values()
            .iter()
            .zip(query.order())
            .fold(0.0, |sum, (&q, &pos)| {
                let diff = (window[pos] - mean) / std - q;
                sum + diff * diff
            });
        WindowScore {
            squared,
            compared: m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stats::mean_std;

    fn score_both(query: &PreparedQuery, window: &[f64], bsf: f64) -> (WindowScore, WindowScore) {
        let (mean, std) = mean_std(window);
        (
            EarlyAbandon::score(query, window, mean, std, bsf),
            Exhaustive::score(query, window, mean, std, bsf),
        )
    }

    #[test]
    fn test_identical_shape_scores_zero() {
        // [1,2,3,4] vs [3,5,7,9]: same shape after scaling and shifting
        let query = PreparedQuery::new(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let (early, full) = score_both(&query, &[3.0, 5.0, 7.0, 9.0], f64::INFINITY);
        assert!(early.squared < 1e-20, "expected 0, got {}", early.squared);
        assert_eq!(early, full);
    }

    #[test]
    fn test_anticorrelated_hand_computed() {
        // [-1, 1] vs [1, -1] after normalization: squared distance 4 + 4 = 8
        let query = PreparedQuery::new(&[1.0, 2.0]).unwrap();
        let (early, full) = score_both(&query, &[4.0, 3.0], f64::INFINITY);
        assert!((full.squared - 8.0).abs() < 1e-12, "got {}", full.squared);
        assert_eq!(early.squared, full.squared);
        assert_eq!(early.compared, 2);
    }

    #[test]
    fn test_early_abandon_stops_at_bound() {
        let query = PreparedQuery::new(&[0.0, 10.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let window = [10.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let (early, full) = score_both(&query, &window, 1.0);
        assert!(early.compared < query.len(), "should abandon early");
        assert!(early.squared >= 1.0);
        assert!(early.squared <= full.squared);
        assert_eq!(full.compared, query.len());
    }

    #[test]
    fn test_constant_window_scores_norm_sq() {
        let query = PreparedQuery::new(&[1.0, 3.0, 2.0, 5.0]).unwrap();
        let (early, full) = score_both(&query, &[7.0; 4], f64::INFINITY);
        assert!((early.squared - 4.0).abs() < 1e-10);
        assert_eq!(early, full);
    }
}
