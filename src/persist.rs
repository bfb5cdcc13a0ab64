//! Model files.
//!
//! A model file carries everything a decoder needs besides the codes: block
//! size, text length and one `prob` line per symbol in ascending symbol
//! order. It is written in the configuration syntax, so it can also be
//! read back as a configuration.
//!
//! ```text
//! num 2
//! len 4
//! prob 65 0.5
//! prob 66 0.5
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::config::{Config, KEY_BLOCK_SIZE, KEY_PROBABILITY, KEY_TEXT_LEN};
use crate::error::{Error, Result};
use crate::model::ProbabilityModel;

/// Contents of a model file.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelFile {
    /// Symbol probabilities.
    pub model: ProbabilityModel,
    /// Symbols per code.
    pub block_size: usize,
    /// Total symbols coded.
    pub text_len: usize,
}

/// Serialize a model file.
pub fn write<W: Write>(file: &ModelFile, mut dst: W) -> Result<()> {
    if file.block_size == 0 {
        return Err(Error::InvalidBlockSize(file.block_size));
    }
    writeln!(dst, "{KEY_BLOCK_SIZE} {}", file.block_size)?;
    writeln!(dst, "{KEY_TEXT_LEN} {}", file.text_len)?;
    for (symbol, p) in file.model.iter() {
        writeln!(dst, "{KEY_PROBABILITY} {symbol} {p}")?;
    }
    dst.flush()?;
    Ok(())
}

/// Parse a model file.
///
/// # Errors
/// Any configuration error, `Error::MissingKey` if `num`, `len` or every
/// `prob` line is absent, and model validation errors.
pub fn read<R: BufRead>(src: R) -> Result<ModelFile> {
    let config = Config::from_reader(src)?;
    let block_size = config.require_block_size()?;
    let text_len = config.require_text_len()?;
    let model = config.model()?.ok_or(Error::MissingKey(KEY_PROBABILITY))?;
    Ok(ModelFile {
        model,
        block_size,
        text_len,
    })
}

/// Write a model file to `path`, replacing any existing file.
pub fn save<P: AsRef<Path>>(file: &ModelFile, path: P) -> Result<()> {
    let out = File::create(path)?;
    write(file, BufWriter::new(out))
}

/// Read a model file from `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ModelFile> {
    let file = File::open(path)?;
    read(BufReader::new(file))
}
