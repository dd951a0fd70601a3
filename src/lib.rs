pub mod algorithms;
pub mod core;
pub mod error;
pub mod io;
pub mod metrics;

pub use crate::algorithms::brute_force::best_match_brute_force;
pub use crate::algorithms::mass::{best_match_mass, mass};
pub use crate::algorithms::search::{search_stream, StreamSearch, WindowEval};
pub use crate::algorithms::shard::search_sharded;
pub use crate::core::best_match::{BestMatch, ScanCounters, SearchResult, WindowScore};
pub use crate::core::config::{QueryOrder, SearchConfig};
pub use crate::core::distance_metric::WindowDistance;
pub use crate::core::query::{load_query, PreparedQuery};
pub use crate::core::stats::RunningStats;
pub use crate::error::{Result, SearchError};
pub use crate::io::{BinarySource, SeriesSource, SliceSource};
pub use crate::metrics::euclidean::{EarlyAbandon, Exhaustive};

/// High-level facade for best-match search, generic over the window evaluator.
///
/// # Examples
///
/// ```
/// use bestmatch::{BestMatchEngine, SearchConfig};
///
/// let series = vec![5.0, 5.0, 0.0, 1.0, 0.0, 5.0, 5.0];
/// let engine = BestMatchEngine::new(SearchConfig::new());
/// let result = engine.search(&[0.0, 1.0, 0.0], &series).unwrap();
/// assert_eq!(result.location, 3);
/// assert!(result.distance < 1e-6);
/// ```
pub struct Engine<D: WindowDistance> {
    config: SearchConfig,
    _metric: std::marker::PhantomData<D>,
}

impl<D: WindowDistance> Engine<D> {
    /// Create a new engine with the given configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            _metric: std::marker::PhantomData,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Normalize and order a raw query, applying the configured length limit.
    pub fn prepare(&self, raw: &[f64]) -> Result<PreparedQuery> {
        let raw = match self.config.query_len {
            Some(len) if len > raw.len() => {
                return Err(SearchError::InvalidInput {
                    reason: format!(
                        "query length {len} exceeds the {} values available",
                        raw.len()
                    ),
                })
            }
            Some(len) => &raw[..len],
            None => raw,
        };
        PreparedQuery::with_strategy(raw, self.config.order)
    }

    /// Find the best match of `query` in an in-memory series.
    ///
    /// Uses sharding when the configuration asks for more than one shard.
    pub fn search(&self, query: &[f64], ts: &[f64]) -> Result<SearchResult> {
        let prepared = self.prepare(query)?;
        self.search_prepared(&prepared, ts)
    }

    /// Find the best match of an already prepared query in an in-memory series.
    pub fn search_prepared(&self, query: &PreparedQuery, ts: &[f64]) -> Result<SearchResult> {
        if self.config.shards > 1 {
            search_sharded::<D>(query, ts, self.config.shards)
        } else {
            search_stream::<_, D>(query, SliceSource::new(ts))
        }
    }

    /// Find the best match of `query` in a streamed series.
    pub fn search_source<S: SeriesSource>(&self, query: &[f64], source: S) -> Result<SearchResult> {
        let prepared = self.prepare(query)?;
        search_stream::<_, D>(&prepared, source)
    }

    /// Start a chunk-by-chunk scan of `source` for a prepared query.
    pub fn stream<'q, S: SeriesSource>(
        &self,
        query: &'q PreparedQuery,
        source: S,
    ) -> Result<StreamSearch<'q, S, D>> {
        StreamSearch::new(query, source)
    }
}

/// Early-abandoning engine, the common case.
pub type BestMatchEngine = Engine<EarlyAbandon>;

/// Engine that scores every window in full; a baseline for pruning checks.
pub type ExhaustiveEngine = Engine<Exhaustive>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_len_limit() {
        let engine = BestMatchEngine::new(SearchConfig::new().with_query_len(3));
        let series = [5.0, 5.0, 0.0, 1.0, 0.0, 5.0, 5.0];
        let result = engine.search(&[0.0, 1.0, 0.0, 9.0, -4.0], &series).unwrap();
        assert_eq!(result.query_len, 3);
        assert_eq!(result.location, 3);

        let err = engine.search(&[0.0, 1.0], &series).unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput { .. }));
    }

    #[test]
    fn test_engines_agree() {
        let series: Vec<f64> = (0..300).map(|i| (i as f64 * 0.3).sin() * (i as f64 * 0.011).cos()).collect();
        let query = &series[120..140];
        let early = BestMatchEngine::new(SearchConfig::new()).search(query, &series).unwrap();
        let full = ExhaustiveEngine::new(SearchConfig::new()).search(query, &series).unwrap();
        assert_eq!(early.location, 121);
        assert_eq!(early.location, full.location);
        assert_eq!(early.distance, full.distance);
    }

    #[test]
    fn test_search_prepared_matches_search() {
        let series = [5.0, 5.0, 0.0, 1.0, 0.0, 5.0, 5.0];
        let raw = [0.0, 1.0, 0.0, 7.0];
        let engine = BestMatchEngine::new(SearchConfig::new());
        let query = load_query(SliceSource::new(&raw), Some(3), QueryOrder::Magnitude).unwrap();
        let prepared = engine.search_prepared(&query, &series).unwrap();
        let direct = engine.search(&raw[..3], &series).unwrap();
        assert_eq!(prepared.location, 3);
        assert_eq!(prepared.location, direct.location);
        assert_eq!(prepared.distance, direct.distance);
    }

    #[test]
    fn test_stream_facade() {
        let engine = BestMatchEngine::new(SearchConfig::new());
        let query = engine.prepare(&[1.0, 4.0, 2.0]).unwrap();
        let data = [3.0, 1.0, 4.0, 2.0, 9.0];
        let result = engine.stream(&query, SliceSource::new(&data)).unwrap().run().unwrap();
        assert_eq!(result.location, 2);
    }
}
