//! Sequential sources of `f64` values.
//!
//! The search reads its reference series strictly in order through
//! [`SeriesSource`]. Files hold raw native-endian IEEE-754 doubles with no
//! header.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use log::trace;

use crate::error::{Result, SearchError};

const VALUE_BYTES: usize = std::mem::size_of::<f64>();

/// A sequential, read-once source of values.
pub trait SeriesSource {
    /// Values still available, if the source knows its length up front.
    fn remaining(&self) -> Option<usize>;

    /// Fill `out` from the front with the next values.
    ///
    /// Returns how many were written. Fewer than `out.len()` means the source
    /// is exhausted.
    fn read_into(&mut self, out: &mut [f64]) -> Result<usize>;
}

impl<S: SeriesSource + ?Sized> SeriesSource for &mut S {
    fn remaining(&self) -> Option<usize> {
        (**self).remaining()
    }

    fn read_into(&mut self, out: &mut [f64]) -> Result<usize> {
        (**self).read_into(out)
    }
}

/// A source over an in-memory slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [f64],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [f64]) -> Self {
        Self { data, pos: 0 }
    }
}

impl SeriesSource for SliceSource<'_> {
    fn remaining(&self) -> Option<usize> {
        Some(self.data.len() - self.pos)
    }

    fn read_into(&mut self, out: &mut [f64]) -> Result<usize> {
        let n = out.len().min(self.data.len() - self.pos);
        out[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// A source decoding native-endian `f64` values from a byte reader.
pub struct BinarySource<R> {
    reader: R,
    remaining: Option<usize>,
    bytes: Vec<u8>,
}

impl BinarySource<BufReader<File>> {
    /// Open a raw `f64` file. Its length is known from the file size.
    ///
    /// # Errors
    /// `Io` if the file cannot be opened, `InvalidInput` if its size is not a
    /// whole number of values.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len() as usize;
        if len % VALUE_BYTES != 0 {
            return Err(SearchError::invalid(format!(
                "{} is {len} bytes, not a whole number of {VALUE_BYTES}-byte values",
                path.display()
            )));
        }
        trace!("opened {} ({} values)", path.display(), len / VALUE_BYTES);
        Ok(Self {
            reader: BufReader::new(file),
            remaining: Some(len / VALUE_BYTES),
            bytes: Vec::new(),
        })
    }
}

impl<R: Read> BinarySource<R> {
    /// Wrap a reader of unknown length.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            remaining: None,
            bytes: Vec::new(),
        }
    }

    /// Wrap a reader that holds exactly `values` values.
    pub fn with_len(reader: R, values: usize) -> Self {
        Self {
            reader,
            remaining: Some(values),
            bytes: Vec::new(),
        }
    }
}

impl<R: Read> SeriesSource for BinarySource<R> {
    fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    fn read_into(&mut self, out: &mut [f64]) -> Result<usize> {
        self.bytes.resize(out.len() * VALUE_BYTES, 0);
        let mut filled = 0;
        while filled < self.bytes.len() {
            match self.reader.read(&mut self.bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if filled % VALUE_BYTES != 0 {
            return Err(SearchError::invalid(format!(
                "source ends with {} trailing bytes, not a whole {VALUE_BYTES}-byte value",
                filled % VALUE_BYTES
            )));
        }

        let n = filled / VALUE_BYTES;
        for (value, chunk) in out[..n]
            .iter_mut()
            .zip(self.bytes[..filled].chunks_exact(VALUE_BYTES))
        {
            let mut raw = [0u8; VALUE_BYTES];
            raw.copy_from_slice(chunk);
            *value = f64::from_ne_bytes(raw);
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(n);
        }
        Ok(n)
    }
}

/// Read `limit` values from `source`, or everything if `limit` is `None`.
///
/// # Errors
/// `InvalidInput` if the source holds fewer than `limit` values.
pub fn read_series<S: SeriesSource>(mut source: S, limit: Option<usize>) -> Result<Vec<f64>> {
    if let (Some(limit), Some(available)) = (limit, source.remaining()) {
        if limit > available {
            return Err(SearchError::invalid(format!(
                "requested {limit} values but the source holds only {available}"
            )));
        }
    }

    match limit {
        Some(limit) => {
            let mut out = vec![0.0; limit];
            let n = source.read_into(&mut out)?;
            if n < limit {
                return Err(SearchError::invalid(format!(
                    "requested {limit} values but the source holds only {n}"
                )));
            }
            Ok(out)
        }
        None => {
            let block = source.remaining().unwrap_or(4096).max(1);
            let mut out = Vec::with_capacity(block);
            let mut buf = vec![0.0; block];
            loop {
                let n = source.read_into(&mut buf)?;
                out.extend_from_slice(&buf[..n]);
                if n < buf.len() {
                    break;
                }
            }
            Ok(out)
        }
    }
}

/// Encode `values` as native-endian bytes, the layout [`BinarySource`] reads.
pub fn to_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}
