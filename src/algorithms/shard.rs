use std::time::Instant;

use log::debug;

use crate::algorithms::search::StreamSearch;
use crate::core::best_match::{BestMatch, ScanCounters, SearchResult};
use crate::core::distance_metric::WindowDistance;
use crate::core::query::PreparedQuery;
use crate::error::{Result, SearchError};
use crate::io::SliceSource;

/// Minimum windows per shard. Smaller shards cost more in buffer bootstraps
/// and statistics resets than they save.
const MIN_SHARD_WINDOWS: usize = 1024;

/// Split `n_windows` window offsets into at most `n_shards` contiguous,
/// non-overlapping `(start, end)` ranges of near-equal size.
pub fn shard_ranges(n_windows: usize, n_shards: usize) -> Vec<(usize, usize)> {
    if n_windows == 0 || n_shards == 0 {
        return vec![];
    }
    let n_shards = n_shards.min(n_windows);
    let base = n_windows / n_shards;
    let extra = n_windows % n_shards;

    let mut ranges = Vec::with_capacity(n_shards);
    let mut start = 0;
    for s in 0..n_shards {
        let len = base + usize::from(s < extra);
        ranges.push((start, start + len));
        start += len;
    }
    ranges
}

/// Scan the windows `start..end` of `ts` as an independent stream.
///
/// The shard reads `ts[start..end + m - 1]`, so neighbouring shards overlap by
/// `m - 1` values and every window belongs to exactly one shard.
fn scan_shard<D: WindowDistance>(
    query: &PreparedQuery,
    ts: &[f64],
    (start, end): (usize, usize),
) -> Result<(BestMatch, ScanCounters)> {
    let m = query.len();
    let slice = &ts[start..end + m - 1];
    let mut search = StreamSearch::<_, D>::new(query, SliceSource::new(slice))?;
    while search.next_chunk()? {}
    let (best, counters) = search.into_parts();
    Ok((best.shifted(start), counters))
}

/// Best-match search over an in-memory series split into independent shards.
///
/// Each shard starts with its own best-so-far at infinity and only shares the
/// read-only query. Shard results are reduced with [`BestMatch::merge`]. With
/// the `parallel` feature shards run on the rayon thread pool; otherwise they
/// run one after another. Shards are never smaller than 1024 windows, so short
/// series are scanned as one stream.
pub fn search_sharded<D: WindowDistance>(
    query: &PreparedQuery,
    ts: &[f64],
    n_shards: usize,
) -> Result<SearchResult> {
    let started = Instant::now();
    let m = query.len();
    if ts.len() < m {
        return Err(SearchError::NoMatch {
            series_len: ts.len(),
            query_len: m,
        });
    }
    let n_windows = ts.len() - m + 1;
    let n_shards = n_shards.min(n_windows.div_ceil(MIN_SHARD_WINDOWS)).max(1);
    let ranges = shard_ranges(n_windows, n_shards);
    debug!("scanning {n_windows} windows in {} shards", ranges.len());

    #[cfg(feature = "parallel")]
    let partials: Vec<(BestMatch, ScanCounters)> = {
        use rayon::prelude::*;
        ranges
            .into_par_iter()
            .map(|range| scan_shard::<D>(query, ts, range))
            .collect::<Result<_>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let partials: Vec<(BestMatch, ScanCounters)> = ranges
        .into_iter()
        .map(|range| scan_shard::<D>(query, ts, range))
        .collect::<Result<_>>()?;

    let mut best = BestMatch::new();
    let mut counters = ScanCounters::default();
    for (shard_best, shard_counters) in &partials {
        best.merge(shard_best);
        counters.merge(shard_counters);
    }
    SearchResult::from_parts(&best, counters, m, started.elapsed())
}
