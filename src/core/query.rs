use crate::core::config::QueryOrder;
use crate::core::stats::mean_std;
use crate::error::{Result, SearchError};
use crate::io::{read_series, SeriesSource};

/// A z-normalized query, stored in evaluation order.
///
/// `values[i]` is the normalized query element at original position
/// `order[i]`. With [`QueryOrder::Magnitude`] the largest-magnitude elements
/// come first, so a distance accumulation over a poorly matching window
/// crosses the best-so-far bound after few terms.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    values: Vec<f64>,
    order: Vec<usize>,
    mean: f64,
    std: f64,
    norm_sq: f64,
}

impl PreparedQuery {
    /// Normalize `raw` and order it by descending magnitude.
    ///
    /// # Errors
    /// - `InvalidInput` if `raw` has fewer than 2 elements.
    /// - `DomainError` if `raw` is constant.
    pub fn new(raw: &[f64]) -> Result<Self> {
        Self::with_strategy(raw, QueryOrder::Magnitude)
    }

    /// Normalize `raw` and order it according to `strategy`.
    pub fn with_strategy(raw: &[f64], strategy: QueryOrder) -> Result<Self> {
        let (mean, std) = checked_stats(raw)?;
        let normalized: Vec<f64> = raw.iter().map(|x| (x - mean) / std).collect();
        let order = match strategy {
            QueryOrder::Magnitude => magnitude_order(&normalized),
            QueryOrder::Natural => (0..raw.len()).collect(),
        };
        Ok(Self::assemble(&normalized, order, mean, std))
    }

    /// Normalize `raw` and evaluate it in a caller-supplied `order`.
    ///
    /// # Errors
    /// `InvalidInput` if `order` is not a permutation of `0..raw.len()`.
    pub fn with_order(raw: &[f64], order: Vec<usize>) -> Result<Self> {
        let (mean, std) = checked_stats(raw)?;
        if order.len() != raw.len() {
            return Err(SearchError::invalid(format!(
                "order has {} indices, query has {} values",
                order.len(),
                raw.len()
            )));
        }
        let mut seen = vec![false; raw.len()];
        for &i in &order {
            if i >= raw.len() || seen[i] {
                return Err(SearchError::invalid(format!(
                    "order is not a permutation of 0..{}: index {i} is out of range or repeated",
                    raw.len()
                )));
            }
            seen[i] = true;
        }
        let normalized: Vec<f64> = raw.iter().map(|x| (x - mean) / std).collect();
        Ok(Self::assemble(&normalized, order, mean, std))
    }

    fn assemble(normalized: &[f64], order: Vec<usize>, mean: f64, std: f64) -> Self {
        let values: Vec<f64> = order.iter().map(|&i| normalized[i]).collect();
        let norm_sq = values.iter().map(|q| q * q).sum();
        Self {
            values,
            order,
            mean,
            std,
            norm_sq,
        }
    }

    /// Query length m.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; a prepared query has at least 2 elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Normalized values in evaluation order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Original position of each evaluated value.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Normalized values back in their original positions.
    pub fn normalized(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.values.len()];
        for (&i, &q) in self.order.iter().zip(&self.values) {
            out[i] = q;
        }
        out
    }

    /// Population mean of the raw query.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of the raw query.
    pub fn std(&self) -> f64 {
        self.std
    }

    /// Sum of squared normalized values (m, up to rounding).
    ///
    /// This is the squared distance to a constant window, whose
    /// z-normalization is taken as all zeros.
    pub fn norm_sq(&self) -> f64 {
        self.norm_sq
    }
}

fn checked_stats(raw: &[f64]) -> Result<(f64, f64)> {
    if raw.len() < 2 {
        return Err(SearchError::invalid(format!(
            "query length must be at least 2, got {}",
            raw.len()
        )));
    }
    // Only an exactly constant query is rejected; any real spread normalizes,
    // whatever its scale. A std that underflows or overflows cannot be divided by.
    let (mean, std) = mean_std(raw);
    let constant = raw.iter().all(|&x| x == raw[0]);
    if constant || !std.is_normal() {
        return Err(SearchError::DomainError { std });
    }
    Ok((mean, std))
}

/// Indices of `normalized` sorted by descending absolute value, ties by index.
fn magnitude_order(normalized: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..normalized.len()).collect();
    // sort_by is stable, so equal magnitudes keep ascending index order
    order.sort_by(|&a, &b| normalized[b].abs().total_cmp(&normalized[a].abs()));
    order
}

/// Read a query from `source` and prepare it.
///
/// `limit` restricts the query to the first `limit` values of the source.
///
/// # Errors
/// `InvalidInput` if `limit` exceeds the values the source can provide, plus
/// everything [`PreparedQuery::with_strategy`] reports.
pub fn load_query<S: SeriesSource>(
    source: S,
    limit: Option<usize>,
    strategy: QueryOrder,
) -> Result<PreparedQuery> {
    let raw = read_series(source, limit)?;
    PreparedQuery::with_strategy(&raw, strategy)
}
