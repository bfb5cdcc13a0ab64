//! Block decoder.
//!
//! Inverse of [`crate::encoder::BlockEncoder`]: each code is repeatedly
//! located in the segment table and rescaled into that segment's frame,
//! yielding one symbol per step. The text length bounds the final block,
//! which may hold fewer than `block_size` symbols.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::codes::CodeReader;
use crate::encoder::block_count;
use crate::error::{Error, Result};
use crate::segment::SegmentTable;

/// Lengths come from files; never reserve more than this up front.
const PREALLOC_LIMIT: usize = 1 << 16;

/// Decoder over a fixed segment table.
pub struct BlockDecoder<'a> {
    table: &'a SegmentTable,
    block_size: usize,
    text_len: usize,
}

impl<'a> BlockDecoder<'a> {
    /// Create a decoder producing `text_len` symbols from codes of
    /// `block_size` symbols each.
    ///
    /// # Errors
    /// Returns `Error::InvalidBlockSize` if `block_size` is 0.
    pub fn new(table: &'a SegmentTable, block_size: usize, text_len: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidBlockSize(block_size));
        }
        Ok(Self {
            table,
            block_size,
            text_len,
        })
    }

    /// Number of codes this decoder consumes.
    pub fn block_count(&self) -> usize {
        block_count(self.text_len, self.block_size)
    }

    /// Symbols carried by block `block`.
    pub fn block_len(&self, block: usize) -> usize {
        let start = block.saturating_mul(self.block_size);
        self.text_len.saturating_sub(start).min(self.block_size)
    }

    /// Decode `count` symbols from one code, appending them to `out`.
    ///
    /// `block` is only used for error reporting.
    ///
    /// # Errors
    /// Returns `Error::CodeOutOfRange` if at some step the code lies in no
    /// segment.
    pub fn decode_block(
        &self,
        block: usize,
        mut code: f64,
        count: usize,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        for position in 0..count {
            let seg = self.table.locate(code).ok_or(Error::CodeOutOfRange {
                block,
                position,
                code,
            })?;
            out.push(seg.symbol);
            code = (code - seg.left) / seg.width();
        }
        Ok(())
    }

    /// Decode a sequence of codes into `text_len` symbols.
    ///
    /// Codes beyond what `text_len` needs are not consumed.
    pub fn decode<I: IntoIterator<Item = f64>>(&self, codes: I) -> Result<Vec<u8>> {
        let expected = self.block_count();
        let mut out = Vec::with_capacity(self.text_len.min(PREALLOC_LIMIT));
        let mut codes = codes.into_iter();
        for block in 0..expected {
            let code = codes.next().ok_or(Error::MissingCode {
                expected,
                found: block,
            })?;
            self.decode_block(block, code, self.block_len(block), &mut out)?;
        }
        Ok(out)
    }

    /// Decode codes from a reader and write the symbols to `dst`.
    ///
    /// Returns the number of symbols written.
    pub fn decode_stream<R: BufRead, W: Write>(
        &self,
        src: &mut CodeReader<R>,
        mut dst: W,
    ) -> Result<usize> {
        let expected = self.block_count();
        let mut out = Vec::with_capacity(self.block_size.min(self.text_len).min(PREALLOC_LIMIT));
        let mut written = 0;
        for block in 0..expected {
            let code = src.next_code()?.ok_or(Error::MissingCode {
                expected,
                found: block,
            })?;
            out.clear();
            self.decode_block(block, code, self.block_len(block), &mut out)?;
            dst.write_all(&out)?;
            written += out.len();
        }
        dst.flush()?;
        debug!(symbols = written, codes = expected, "decoded stream");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BlockEncoder;
    use crate::model::ProbabilityModel;

    fn ab_table() -> SegmentTable {
        let model = ProbabilityModel::from_probabilities([(b'A', 0.5), (b'B', 0.5)]).unwrap();
        SegmentTable::derive(&model).unwrap()
    }

    #[test]
    fn test_abba_roundtrip() {
        let table = ab_table();
        let decoder = BlockDecoder::new(&table, 2, 4).unwrap();
        assert_eq!(decoder.decode([0.375, 0.625]).unwrap(), b"ABBA");
    }

    #[test]
    fn test_final_block_truncated() {
        let table = ab_table();
        let encoder = BlockEncoder::new(&table, 4).unwrap();
        let data = b"BBABAB";
        let codes = encoder.encode(data).unwrap();
        let decoder = BlockDecoder::new(&table, 4, data.len()).unwrap();
        assert_eq!(decoder.block_count(), 2);
        assert_eq!(decoder.block_len(0), 4);
        assert_eq!(decoder.block_len(1), 2);
        assert_eq!(decoder.decode(codes).unwrap(), data);
    }

    #[test]
    fn test_single_symbol() {
        let model = ProbabilityModel::from_probabilities([(b'A', 1.0)]).unwrap();
        let table = SegmentTable::derive(&model).unwrap();
        let decoder = BlockDecoder::new(&table, 3, 7).unwrap();
        assert_eq!(decoder.decode([0.5, 0.5, 0.5]).unwrap(), b"AAAAAAA");
    }

    #[test]
    fn test_missing_code() {
        let table = ab_table();
        let decoder = BlockDecoder::new(&table, 2, 5).unwrap();
        assert!(matches!(
            decoder.decode([0.375, 0.625]),
            Err(Error::MissingCode {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_code_outside_every_segment() {
        let table = ab_table();
        let decoder = BlockDecoder::new(&table, 2, 2).unwrap();
        match decoder.decode([1.25]) {
            Err(Error::CodeOutOfRange {
                block, position, ..
            }) => {
                assert_eq!(block, 0);
                assert_eq!(position, 0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_zero_length_needs_no_codes() {
        let table = ab_table();
        let decoder = BlockDecoder::new(&table, 2, 0).unwrap();
        assert_eq!(decoder.block_count(), 0);
        assert!(decoder.decode(std::iter::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_stream() {
        let table = ab_table();
        let decoder = BlockDecoder::new(&table, 2, 3).unwrap();
        let mut reader = CodeReader::new("0.375\n0.25\n".as_bytes());
        let mut out = Vec::new();
        let n = decoder.decode_stream(&mut reader, &mut out).unwrap();
        assert_eq!(n, 3);
        assert_eq!(out, b"ABA");
        assert!(reader.next_code().unwrap().is_none());
    }
}
