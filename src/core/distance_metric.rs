use crate::core::best_match::WindowScore;
use crate::core::query::PreparedQuery;

/// Scores one window against a prepared query.
///
/// Designed for static polymorphism: the scan is generic over
/// `D: WindowDistance`, so the inner loop is monomorphized per evaluator.
pub trait WindowDistance: Clone + Send + Sync {
    /// Squared distance between the z-normalized `window` and `query`.
    ///
    /// `mean` and `std` are the window's population statistics. `bsf` is the
    /// current best-so-far squared distance; an implementation may stop once
    /// its partial sum reaches `bsf` and return that partial sum, which then
    /// cannot become the new best.
    fn score(query: &PreparedQuery, window: &[f64], mean: f64, std: f64, bsf: f64)
        -> WindowScore;

}
