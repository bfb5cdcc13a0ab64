//! Block encoder.
//!
//! Symbols are coded in blocks of `block_size`. Within a block the working
//! interval starts at `[0, 1)` and is narrowed to each symbol's segment in
//! turn; the block's code is the midpoint of what remains. Restarting every
//! block caps how far the interval can shrink, which is what keeps `f64`
//! precision sufficient to tell symbol sequences apart.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::codes::CodeWriter;
use crate::error::{Error, Result};
use crate::segment::SegmentTable;

/// Number of codes needed for `text_len` symbols, i.e. `ceil(text_len / block_size)`.
pub fn block_count(text_len: usize, block_size: usize) -> usize {
    if block_size == 0 {
        return 0;
    }
    text_len.div_ceil(block_size)
}

/// Encoder over a fixed segment table.
pub struct BlockEncoder<'a> {
    table: &'a SegmentTable,
    block_size: usize,
}

impl<'a> BlockEncoder<'a> {
    /// Create an encoder emitting one code per `block_size` symbols.
    ///
    /// # Errors
    /// Returns `Error::InvalidBlockSize` if `block_size` is 0.
    pub fn new(table: &'a SegmentTable, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidBlockSize(block_size));
        }
        Ok(Self { table, block_size })
    }

    /// Symbols per code.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Code one block (at most `block_size` symbols, fewer for the tail).
    ///
    /// # Errors
    /// Returns `Error::UnknownSymbol` for a symbol without a segment.
    pub fn encode_block(&self, block: &[u8]) -> Result<f64> {
        debug_assert!(block.len() <= self.block_size);
        let mut interval = Interval::new();
        for &symbol in block {
            interval.narrow(self.table, symbol)?;
        }
        Ok(interval.code())
    }

    /// Code a whole slice.
    pub fn encode(&self, symbols: &[u8]) -> Result<Vec<f64>> {
        symbols
            .chunks(self.block_size)
            .map(|block| self.encode_block(block))
            .collect()
    }

    /// Code a stream until EOF, writing each block's code as soon as the
    /// block is complete. A short final block still gets a code.
    ///
    /// Returns the number of symbols consumed.
    pub fn encode_stream<R: Read, W: Write>(
        &self,
        mut src: R,
        dst: &mut CodeWriter<W>,
    ) -> Result<usize> {
        let mut buf = vec![0u8; self.block_size.min(STREAM_CHUNK)];
        let mut interval = Interval::new();
        let mut in_block = 0;
        let mut symbols = 0;
        loop {
            let want = (self.block_size - in_block).min(buf.len());
            let n = fill(&mut src, &mut buf[..want])?;
            for &symbol in &buf[..n] {
                interval.narrow(self.table, symbol)?;
            }
            in_block += n;
            symbols += n;
            if in_block == self.block_size {
                dst.write_code(interval.code())?;
                interval = Interval::new();
                in_block = 0;
            }
            if n < want {
                break;
            }
        }
        if in_block > 0 {
            dst.write_code(interval.code())?;
        }
        debug!(symbols, codes = dst.count(), "encoded stream");
        Ok(symbols)
    }
}

/// Upper bound on the read buffer, independent of block size.
const STREAM_CHUNK: usize = 64 * 1024;

/// Working interval `[low, high)` of the block being coded.
struct Interval {
    low: f64,
    high: f64,
}

impl Interval {
    fn new() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
        }
    }

    fn narrow(&mut self, table: &SegmentTable, symbol: u8) -> Result<()> {
        let seg = table.get(symbol).ok_or(Error::UnknownSymbol(symbol))?;
        let range = self.high - self.low;
        self.high = self.low + range * seg.right;
        self.low += range * seg.left;
        Ok(())
    }

    /// Midpoint of the interval.
    fn code(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

/// Read until `buf` is full or the source is exhausted.
fn fill<R: Read>(src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
