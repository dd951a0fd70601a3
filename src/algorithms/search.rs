use std::marker::PhantomData;
use std::time::Instant;

use log::debug;

use crate::core::best_match::{BestMatch, ScanCounters, SearchResult};
use crate::core::buffer::WindowBuffer;
use crate::core::distance_metric::WindowDistance;
use crate::core::query::PreparedQuery;
use crate::core::stats::RunningStats;
use crate::error::Result;
use crate::io::SeriesSource;
use crate::metrics::euclidean::EarlyAbandon;

/// One scored window, reported to scan observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowEval {
    /// 0-based offset of the window in the reference series.
    pub offset: usize,
    /// Window mean.
    pub mean: f64,
    /// Window population standard deviation.
    pub std: f64,
    /// Squared distance, or the partial sum at which it was abandoned.
    pub squared: f64,
    /// Best-so-far squared distance after folding in this window.
    pub best: f64,
}

/// Streaming best-match scan over a [`SeriesSource`].
///
/// Memory use is a `2m` buffer regardless of series length. The scan advances
/// one buffer chunk per [`next_chunk`](Self::next_chunk) call; between calls
/// the window statistics hold no carried state (they are rebuilt exactly at
/// each chunk start), so a caller may stop, inspect [`best`](Self::best) or
/// enforce a time budget at any chunk boundary.
pub struct StreamSearch<'q, S, D: WindowDistance = EarlyAbandon> {
    query: &'q PreparedQuery,
    buffer: WindowBuffer<S>,
    stats: RunningStats,
    best: BestMatch,
    counters: ScanCounters,
    /// Series offset of buffer slot 0.
    base: usize,
    finished: bool,
    started: Instant,
    _metric: PhantomData<D>,
}

impl<'q, S: SeriesSource, D: WindowDistance> StreamSearch<'q, S, D> {
    /// Start a scan of `source` for `query`, reading the first m values.
    ///
    /// # Errors
    /// `NoMatch` if the source holds fewer than m values.
    pub fn new(query: &'q PreparedQuery, source: S) -> Result<Self> {
        let started = Instant::now();
        let m = query.len();
        let buffer = WindowBuffer::bootstrap(source, m)?;
        Ok(Self {
            query,
            buffer,
            stats: RunningStats::new(m),
            best: BestMatch::new(),
            counters: ScanCounters::default(),
            base: 0,
            finished: false,
            started,
            _metric: PhantomData,
        })
    }

    /// Scan the next chunk. Returns `false` once the series is exhausted.
    pub fn next_chunk(&mut self) -> Result<bool> {
        self.next_chunk_with(|_| {})
    }

    /// Scan the next chunk, reporting every scored window to `observe`.
    pub fn next_chunk_with<F>(&mut self, mut observe: F) -> Result<bool>
    where
        F: FnMut(&WindowEval),
    {
        if self.finished {
            return Ok(false);
        }
        let chunk = self.buffer.refill()?;
        let m = self.query.len();
        let data = self.buffer.as_slice();

        self.stats.reset(&data[..m - 1]);
        for j in 0..chunk.windows() {
            self.stats.push(data[j + m - 1]);
            let (mean, std) = self.stats.mean_std();
            let score = D::score(
                self.query,
                self.buffer.window(j),
                mean,
                std,
                self.best.squared(),
            );
            let offset = self.base + j;
            self.counters.record(score, m);
            self.best.update(offset, score.squared);
            observe(&WindowEval {
                offset,
                mean,
                std,
                squared: score.squared,
                best: self.best.squared(),
            });
            self.stats.pop(data[j]);
            if !data[j].is_finite() {
                // NaN and infinities never cancel out of the sums
                self.stats.reset(&data[j + 1..j + m]);
            }
        }

        if chunk.full {
            self.buffer.rotate();
            self.base += m;
            debug!(
                "chunk done: {} windows scanned, best {:.6} at offset {:?}",
                self.counters.windows,
                self.best.distance(),
                self.best.offset()
            );
            Ok(true)
        } else {
            self.finished = true;
            self.counters.points_scanned = self.buffer.points_read();
            Ok(false)
        }
    }

    /// Scan to the end and report the best match.
    ///
    /// # Errors
    /// Source errors, or `NoMatch` if no window produced a comparable
    /// distance (e.g. the series is all NaN).
    pub fn run(mut self) -> Result<SearchResult> {
        while self.next_chunk()? {}
        self.into_result()
    }

    /// Scan to the end, reporting every scored window to `observe`.
    pub fn run_with<F>(mut self, mut observe: F) -> Result<SearchResult>
    where
        F: FnMut(&WindowEval),
    {
        while self.next_chunk_with(&mut observe)? {}
        self.into_result()
    }

    /// Best match found so far.
    pub fn best(&self) -> &BestMatch {
        &self.best
    }

    /// Work done so far.
    pub fn counters(&self) -> ScanCounters {
        ScanCounters {
            points_scanned: self.buffer.points_read(),
            ..self.counters
        }
    }

    /// Whether the series has been fully scanned.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop here and hand back the accumulator and counters.
    pub fn into_parts(self) -> (BestMatch, ScanCounters) {
        let counters = self.counters();
        (self.best, counters)
    }

    fn into_result(self) -> Result<SearchResult> {
        let m = self.query.len();
        let elapsed = self.started.elapsed();
        let (best, counters) = self.into_parts();
        debug!(
            "scan finished: {} points, {} windows, {:.1}% abandoned, best {:.6} at location {:?}",
            counters.points_scanned,
            counters.windows,
            counters.abandon_rate() * 100.0,
            best.distance(),
            best.location()
        );
        SearchResult::from_parts(&best, counters, m, elapsed)
    }
}

/// Scan `source` for `query` with evaluator `D`.
pub fn search_stream<S: SeriesSource, D: WindowDistance>(
    query: &PreparedQuery,
    source: S,
) -> Result<SearchResult> {
    StreamSearch::<S, D>::new(query, source)?.run()
}
