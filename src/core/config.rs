use serde::{Deserialize, Serialize};

/// Order in which query elements are compared against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOrder {
    /// Descending magnitude of the normalized query (pruning heuristic).
    #[default]
    Magnitude,
    /// Original left-to-right order; disables the reordering heuristic.
    Natural,
}

/// Configuration for a best-match search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Use only the first `query_len` values of the query, if set.
    pub query_len: Option<usize>,
    /// Query evaluation order.
    pub order: QueryOrder,
    /// Number of shards for in-memory searches. 1 scans as a single stream.
    pub shards: usize,
}

impl SearchConfig {
    pub fn new() -> Self {
        Self {
            query_len: None,
            order: QueryOrder::Magnitude,
            shards: 1,
        }
    }

    /// Restrict the query to its first `len` values.
    pub fn with_query_len(mut self, len: usize) -> Self {
        self.query_len = Some(len);
        self
    }

    pub fn with_order(mut self, order: QueryOrder) -> Self {
        self.order = order;
        self
    }

    /// Split in-memory searches into `shards` independent scans (at least 1).
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards.max(1);
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}
