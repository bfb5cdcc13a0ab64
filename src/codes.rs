//! Text code stream: one decimal code per line, one line per block.
//!
//! Codes are written with the shortest representation that parses back to
//! the same `f64`, so a written stream decodes exactly as if it had never
//! left memory.

use std::io::{BufRead, Write};

use crate::error::{Error, Result};

/// Writes codes, one per line.
pub struct CodeWriter<W: Write> {
    inner: W,
    count: usize,
}

impl<W: Write> CodeWriter<W> {
    /// Wrap a sink.
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Append one code.
    pub fn write_code(&mut self, code: f64) -> Result<()> {
        writeln!(self.inner, "{}", code)?;
        self.count += 1;
        Ok(())
    }

    /// Codes written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Flush and return the sink.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads codes, one per line. Blank lines are skipped.
pub struct CodeReader<R: BufRead> {
    inner: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> CodeReader<R> {
    /// Wrap a source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buf: String::new(),
        }
    }

    /// Next code, or `None` at end of stream.
    ///
    /// # Errors
    /// `Error::MalformedCode` for a line that is not a finite number.
    pub fn next_code(&mut self) -> Result<Option<f64>> {
        loop {
            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return match text.parse::<f64>() {
                Ok(code) if code.is_finite() => Ok(Some(code)),
                _ => Err(Error::MalformedCode {
                    line: self.line,
                    text: text.to_string(),
                }),
            };
        }
    }

    /// Lines consumed so far, including blank ones.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for CodeReader<R> {
    type Item = Result<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_code().transpose()
    }
}
