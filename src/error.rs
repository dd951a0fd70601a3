//! Error types for best-match search.
//!
//! Every error aborts the scan that raised it. None of them is transient, so
//! nothing is retried internally and no partial result is ever returned.

use thiserror::Error;

/// The error type for query preparation, streaming and search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query is too short, a query length limit exceeds the available
    /// data, or a source is malformed.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of what was wrong with the input.
        reason: String,
    },

    /// The query has zero variance, so its z-normalization is undefined.
    #[error("query has zero variance (std = {std:e}); z-normalization is undefined")]
    DomainError {
        /// Population standard deviation of the rejected query.
        std: f64,
    },

    /// A source delivered fewer values than it announced.
    ///
    /// Chunk sizes are derived from the length a source reports up front, so
    /// this indicates a broken source rather than a short series.
    #[error("stream ended early: expected {expected} values, got {actual}")]
    EndOfStream {
        /// Number of values the chunk required.
        expected: usize,
        /// Number of values actually delivered.
        actual: usize,
    },

    /// The reference series is shorter than the query, so no window exists.
    #[error("no match: reference series has {series_len} values, query needs {query_len}")]
    NoMatch {
        /// Number of values the reference series provided.
        series_len: usize,
        /// Query length m.
        query_len: usize,
    },

    /// Reading a file-backed source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;
