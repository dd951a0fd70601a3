use log::trace;

use crate::error::{Result, SearchError};
use crate::io::SeriesSource;

/// One refill of the upper half of a [`WindowBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Values read into the upper half.
    pub len: usize,
    /// Whether the upper half was filled completely.
    pub full: bool,
}

impl Chunk {
    /// Number of window offsets this chunk makes available.
    ///
    /// A full chunk exposes offsets `0..m`; the window at offset `m` is
    /// offset 0 of the next chunk after rotation. A short chunk is the last
    /// one and exposes `0..=len`.
    pub fn windows(&self) -> usize {
        if self.full {
            self.len
        } else {
            self.len + 1
        }
    }
}

/// A `2m` buffer presenting a stream as windows that never wrap around.
///
/// The lower half `[0, m)` holds the m values preceding the current chunk and
/// the upper half `[m, 2m)` receives the chunk itself, so every window
/// starting in the lower half lies in one contiguous slice. Once a full chunk
/// is consumed, [`rotate`](Self::rotate) copies the upper half down.
pub struct WindowBuffer<S> {
    source: S,
    data: Vec<f64>,
    m: usize,
    /// Values still expected from `source` when it knows its length.
    expected: Option<usize>,
    points_read: usize,
}

impl<S: SeriesSource> WindowBuffer<S> {
    /// Fill the lower half with the first m values of `source`.
    ///
    /// # Errors
    /// `NoMatch` if the source holds fewer than m values.
    pub fn bootstrap(mut source: S, m: usize) -> Result<Self> {
        debug_assert!(m >= 2);
        let expected = source.remaining();
        if let Some(available) = expected {
            if available < m {
                return Err(SearchError::NoMatch {
                    series_len: available,
                    query_len: m,
                });
            }
        }

        let mut data = vec![0.0; 2 * m];
        let read = source.read_into(&mut data[..m])?;
        if read < m {
            return match expected {
                Some(_) => Err(SearchError::EndOfStream {
                    expected: m,
                    actual: read,
                }),
                None => Err(SearchError::NoMatch {
                    series_len: read,
                    query_len: m,
                }),
            };
        }
        trace!("window buffer bootstrapped with {m} values");

        Ok(Self {
            source,
            data,
            m,
            expected: expected.map(|n| n - m),
            points_read: m,
        })
    }

    /// Read the next chunk of up to m values into the upper half.
    ///
    /// # Errors
    /// `EndOfStream` if a source of known length delivers less than it
    /// announced.
    pub fn refill(&mut self) -> Result<Chunk> {
        let m = self.m;
        let want = self.expected.map_or(m, |left| left.min(m));
        let read = self.source.read_into(&mut self.data[m..m + want])?;
        if let Some(left) = self.expected.as_mut() {
            if read < want {
                return Err(SearchError::EndOfStream {
                    expected: want,
                    actual: read,
                });
            }
            *left -= read;
        }
        self.points_read += read;
        Ok(Chunk {
            len: read,
            full: read == m,
        })
    }

    /// Copy the upper half onto the lower half.
    pub fn rotate(&mut self) {
        self.data.copy_within(self.m.., 0);
    }

    /// The whole `2m` buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// The window starting at buffer offset `j`.
    #[inline]
    pub fn window(&self, j: usize) -> &[f64] {
        &self.data[j..j + self.m]
    }

    /// Total values read from the source so far.
    pub fn points_read(&self) -> usize {
        self.points_read
    }
}
