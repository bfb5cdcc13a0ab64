//! Error types for the block coder.
//!
//! Every failure falls into one of four kinds (see [`ErrorKind`]): bad
//! configuration, I/O, an unusable probability model, or a code stream that
//! does not decode against the model it is paired with.

use thiserror::Error;

/// Error variants for coding operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration or model file line could not be understood.
    #[error("line {line}: {reason}")]
    Config {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A key required for the requested operation was never given.
    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    /// Block size must be at least one symbol.
    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// An I/O error occurred while reading or writing a stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The model has no symbols.
    #[error("empty probability model")]
    EmptyModel,

    /// A probability is not finite or lies outside (0, 1].
    #[error("invalid probability {probability} for symbol {symbol}")]
    InvalidProbability {
        /// Offending symbol.
        symbol: u8,
        /// Offending probability.
        probability: f64,
    },

    /// Probabilities do not sum to one.
    #[error("probabilities sum to {sum}, allowed deviation from 1 is {tolerance}")]
    ProbabilitySum {
        /// Actual sum.
        sum: f64,
        /// Allowed absolute deviation.
        tolerance: f64,
    },

    /// Cumulative drift left a symbol with an empty interval.
    #[error("segment for symbol {symbol} is empty")]
    DegenerateSegment {
        /// Symbol whose segment collapsed.
        symbol: u8,
    },

    /// The encoder was handed a symbol the model does not contain.
    #[error("symbol {0} is not in the model")]
    UnknownSymbol(u8),

    /// A line of the code stream is not a finite number.
    #[error("code line {line}: cannot parse `{text}`")]
    MalformedCode {
        /// 1-based line number.
        line: usize,
        /// The raw line.
        text: String,
    },

    /// The code stream ended before every block was decoded.
    #[error("expected {expected} codes, found {found}")]
    MissingCode {
        /// Codes needed for the text length.
        expected: usize,
        /// Codes actually read.
        found: usize,
    },

    /// A code fell outside every segment.
    #[error("code {code} in block {block} at position {position} matches no segment")]
    CodeOutOfRange {
        /// 0-based block index.
        block: usize,
        /// 0-based symbol position within the block.
        position: usize,
        /// The (rescaled) code value.
        code: f64,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or incomplete configuration or model file.
    Config,
    /// File or stream I/O failure.
    Io,
    /// The probability model cannot be used for coding.
    ModelIntegrity,
    /// Codes do not decode against the model.
    DecodeIntegrity,
}

impl Error {
    /// The kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } | Error::MissingKey(_) | Error::InvalidBlockSize(_) => {
                ErrorKind::Config
            }
            Error::Io(_) => ErrorKind::Io,
            Error::EmptyModel
            | Error::InvalidProbability { .. }
            | Error::ProbabilitySum { .. }
            | Error::DegenerateSegment { .. }
            | Error::UnknownSymbol(_) => ErrorKind::ModelIntegrity,
            Error::MalformedCode { .. } | Error::MissingCode { .. } | Error::CodeOutOfRange { .. } => {
                ErrorKind::DecodeIntegrity
            }
        }
    }

    pub(crate) fn config(line: usize, reason: impl Into<String>) -> Self {
        Error::Config {
            line,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for coding operations.
pub type Result<T> = std::result::Result<T, Error>;
