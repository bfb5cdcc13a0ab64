//! File-level encode and decode runs.
//!
//! These are the entry points a front end calls: a source path, a
//! destination path and a configuration path go in, a summary or a typed
//! error comes out. Nothing here exits the process.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::codes::{CodeReader, CodeWriter};
use crate::config::{Config, Target};
use crate::decoder::BlockDecoder;
use crate::encoder::{block_count, BlockEncoder};
use crate::error::Result;
use crate::model::ProbabilityModel;
use crate::persist::{self, ModelFile};
use crate::segment::SegmentTable;

/// Outcome of a successful encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Bytes read from the source.
    pub text_len: usize,
    /// Symbols per code.
    pub block_size: usize,
    /// Distinct symbols in the model.
    pub symbols: usize,
    /// Codes written.
    pub codes: usize,
}

/// Outcome of a successful decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Bytes written to the destination.
    pub text_len: usize,
    /// Symbols per code.
    pub block_size: usize,
    /// Codes consumed.
    pub codes: usize,
}

/// Outcome of [`run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Summary {
    /// An encode ran.
    Encode(EncodeSummary),
    /// A decode ran.
    Decode(DecodeSummary),
}

/// Run whichever operation the configuration's `target` names.
pub fn run(source: &Path, dest: &Path, config: &Path) -> Result<Summary> {
    let cfg = Config::load(config)?;
    match cfg.target {
        Target::Encode => encode_with(source, dest, &cfg).map(Summary::Encode),
        Target::Decode => decode_with(source, dest, &cfg).map(Summary::Decode),
    }
}

/// Encode the bytes of `source` into codes at `dest`.
///
/// The configuration must name a block size (`num`) and a model file
/// (`table`); the model file is written after the codes.
pub fn run_encode(source: &Path, dest: &Path, config: &Path) -> Result<EncodeSummary> {
    let cfg = Config::load(config)?;
    encode_with(source, dest, &cfg)
}

/// Decode the codes at `source` into bytes at `dest`.
///
/// The model comes from inline `prob` entries (with `num` and `len`) if the
/// configuration has any, else from the model file it names.
pub fn run_decode(source: &Path, dest: &Path, config: &Path) -> Result<DecodeSummary> {
    let cfg = Config::load(config)?;
    decode_with(source, dest, &cfg)
}

fn encode_with(source: &Path, dest: &Path, cfg: &Config) -> Result<EncodeSummary> {
    let block_size = cfg.require_block_size()?;
    let table_path = cfg.require_table()?;
    if !cfg.probabilities.is_empty() {
        warn!(
            entries = cfg.probabilities.len(),
            "ignoring configured probabilities, the model is counted from the source"
        );
    }

    let (model, text_len) = ProbabilityModel::build(BufReader::new(File::open(source)?))?;
    if let Some(configured) = cfg.text_len.filter(|&len| len != text_len) {
        warn!(configured, counted = text_len, "configured length differs from source");
    }
    let safe = model.max_safe_block_size();
    if block_size > safe {
        warn!(block_size, safe, "block size exceeds reliable f64 precision");
    }
    info!(text_len, symbols = model.len(), block_size, "model built");

    let table = SegmentTable::derive(&model)?;
    let encoder = BlockEncoder::new(&table, block_size)?;
    let mut writer = CodeWriter::new(BufWriter::new(File::create(dest)?));
    let encoded = encoder.encode_stream(BufReader::new(File::open(source)?), &mut writer)?;
    let codes = writer.count();
    writer.finish()?;
    if encoded != text_len {
        warn!(counted = text_len, encoded, "source changed between passes");
    }

    let file = ModelFile {
        model,
        block_size,
        text_len: encoded,
    };
    persist::save(&file, table_path)?;
    debug!(path = %table_path.display(), "model file written");
    info!(codes, "encoding finished");

    Ok(EncodeSummary {
        text_len: encoded,
        block_size,
        symbols: file.model.len(),
        codes,
    })
}

fn resolve_model(cfg: &Config) -> Result<ModelFile> {
    if let Some(model) = cfg.model()? {
        debug!(symbols = model.len(), "using configured model");
        return Ok(ModelFile {
            model,
            block_size: cfg.require_block_size()?,
            text_len: cfg.require_text_len()?,
        });
    }

    let path = cfg.require_table()?;
    let file = persist::load(path)?;
    debug!(path = %path.display(), symbols = file.model.len(), "model file loaded");
    if let Some(configured) = cfg.block_size.filter(|&n| n != file.block_size) {
        warn!(configured, stored = file.block_size, "using block size from model file");
    }
    if let Some(configured) = cfg.text_len.filter(|&n| n != file.text_len) {
        warn!(configured, stored = file.text_len, "using text length from model file");
    }
    Ok(file)
}

fn decode_with(source: &Path, dest: &Path, cfg: &Config) -> Result<DecodeSummary> {
    let file = resolve_model(cfg)?;
    let table = SegmentTable::derive(&file.model)?;
    let decoder = BlockDecoder::new(&table, file.block_size, file.text_len)?;
    info!(
        text_len = file.text_len,
        block_size = file.block_size,
        symbols = file.model.len(),
        "decoding"
    );

    let mut reader = CodeReader::new(BufReader::new(File::open(source)?));
    let written = decoder.decode_stream(&mut reader, BufWriter::new(File::create(dest)?))?;
    let codes = block_count(file.text_len, file.block_size);
    if !matches!(reader.next_code(), Ok(None)) {
        warn!(expected = codes, "ignoring data past the last needed code");
    }
    info!(symbols = written, "decoding finished");

    Ok(DecodeSummary {
        text_len: written,
        block_size: file.block_size,
        codes,
    })
}
