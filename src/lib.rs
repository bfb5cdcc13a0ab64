//! # Block Arithmetic Coding
//!
//! *Interval narrowing with plain `f64`, one real number per block.*
//!
//! ## Intuition First
//!
//! Cut a ruler of length one into pieces, one per byte value, each piece as
//! long as that byte's frequency. To write a byte, zoom into its piece. To
//! write the next byte, cut the zoomed piece the same way and zoom again.
//! After a few bytes you are looking at a tiny stretch of the ruler, and any
//! point inside it identifies the whole sequence. Reading it back means
//! asking "which piece am I in?", zooming out, and asking again.
//!
//! ## The Problem
//!
//! Every zoom multiplies the interval width by a probability below one, so
//! it shrinks geometrically. An `f64` has 53 bits of mantissa; after enough
//! symbols two different sequences land on the same float. Production
//! arithmetic coders renormalize with integer arithmetic. This crate takes
//! the simpler route: it restarts the interval every `block_size` symbols
//! and emits one code per block, so no block narrows past what the float
//! can hold.
//!
//! ## Mathematical Formulation
//!
//! For symbols ordered ascending, symbol $s$ owns $[L_s, R_s)$ with
//! $L_s = \sum_{t < s} p_t$ and $R_s = L_s + p_s$. Encoding a block
//! $s_1 \dots s_n$:
//!
//! ```text
//! [low, high) = [0, 1)
//! for s in block:  [low, high) = [low + (high-low)·L_s, low + (high-low)·R_s)
//! code = (low + high) / 2
//! ```
//!
//! Decoding inverts it: find $s$ with $L_s \le c < R_s$, emit $s$, set
//! $c \leftarrow (c - L_s) / (R_s - L_s)$.
//!
//! ## Failure Modes
//!
//! 1. **Precision loss**: a block narrower than about $2^{-40}$ may decode
//!    wrongly; [`ProbabilityModel::max_safe_block_size`] gives the bound.
//! 2. **Model mismatch**: decoding against a different model than the one
//!    used to encode yields codes outside every segment, reported as
//!    [`Error::CodeOutOfRange`] rather than garbage output.
//!
//! ## Implementation Notes
//!
//! - [`model`]: static byte frequencies.
//! - [`segment`]: deterministic partition of `[0, 1)`.
//! - [`encoder`] / [`decoder`]: block coding.
//! - [`codes`]: text code stream, one code per line.
//! - [`config`] / [`persist`]: configuration and model files.
//! - [`run`]: file-level encode/decode used by the `arcode` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codes;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod model;
pub mod persist;
pub mod run;
pub mod segment;

pub use codes::{CodeReader, CodeWriter};
pub use config::{Config, Target};
pub use decoder::BlockDecoder;
pub use encoder::{block_count, BlockEncoder};
pub use error::{Error, ErrorKind, Result};
pub use model::{ProbabilityModel, SymbolCounts, TOLERANCE};
pub use persist::ModelFile;
pub use run::{run, run_decode, run_encode, DecodeSummary, EncodeSummary, Summary};
pub use segment::{Segment, SegmentTable};
