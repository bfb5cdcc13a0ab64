//! Static order-0 probability model.
//!
//! The model is the empirical byte distribution of a stream: each observed
//! byte maps to `count / total`. Symbols that never occur are absent, so
//! every stored probability lies in (0, 1]. Symbols are kept in ascending
//! numeric order, which is the order segments are laid out in.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Read};

use crate::error::{Error, Result};

/// Allowed floating-point slack.
///
/// A model is accepted when its probabilities sum to one within
/// `TOLERANCE * len`. The decoder accepts codes up to `TOLERANCE` outside
/// `[0, 1)` as belonging to the first or last segment.
pub const TOLERANCE: f64 = 1e-9;

/// Mantissa bits a block may consume before decoding becomes unreliable.
///
/// `f64` has 53; the remainder absorbs rounding in the narrowing and
/// rescaling steps.
pub const SAFE_PRECISION_BITS: f64 = 40.0;

/// Number of distinct symbols.
pub const ALPHABET_SIZE: usize = 256;

/// Per-byte occurrence counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolCounts {
    counts: [u64; ALPHABET_SIZE],
}

impl SymbolCounts {
    /// Empty counts.
    pub fn new() -> Self {
        Self {
            counts: [0; ALPHABET_SIZE],
        }
    }

    /// Count every byte of a slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = Self::new();
        counts.update(data);
        counts
    }

    /// Count every byte of a stream until EOF.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut counts = Self::new();
        let mut buf = [0u8; 8192];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => counts.update(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(counts)
    }

    /// Add the bytes of `data`.
    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.counts[b as usize] += 1;
        }
    }

    /// Occurrences of one symbol.
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl Default for SymbolCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Mapping from symbol to probability, ascending by symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityModel {
    probabilities: BTreeMap<u8, f64>,
}

impl ProbabilityModel {
    /// Count a stream and derive its model.
    ///
    /// Returns the model together with the number of bytes read.
    pub fn build<R: Read>(reader: R) -> Result<(Self, usize)> {
        let counts = SymbolCounts::from_reader(reader)?;
        let model = Self::from_counts(&counts)?;
        Ok((model, counts.total() as usize))
    }

    /// Derive the model of an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_counts(&SymbolCounts::from_bytes(data))
    }

    /// Normalize counts into probabilities.
    ///
    /// # Errors
    /// Returns `Error::EmptyModel` if nothing was counted.
    pub fn from_counts(counts: &SymbolCounts) -> Result<Self> {
        let total = counts.total();
        if total == 0 {
            return Err(Error::EmptyModel);
        }
        let probabilities = (0..=u8::MAX)
            .filter(|&s| counts.get(s) > 0)
            .map(|s| (s, counts.get(s) as f64 / total as f64))
            .collect();
        Ok(Self { probabilities })
    }

    /// Build a model from explicit `(symbol, probability)` pairs.
    ///
    /// # Errors
    /// Fails if the set is empty, any probability is outside (0, 1], or the
    /// sum deviates from one by more than `TOLERANCE * len`. A repeated
    /// symbol keeps its last probability.
    pub fn from_probabilities<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, f64)>,
    {
        let probabilities: BTreeMap<u8, f64> = entries.into_iter().collect();
        let model = Self { probabilities };
        model.validate()?;
        Ok(model)
    }

    /// Read a persisted model file and keep only its probabilities.
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        Ok(crate::persist::read(reader)?.model)
    }

    fn validate(&self) -> Result<()> {
        if self.probabilities.is_empty() {
            return Err(Error::EmptyModel);
        }
        for (&symbol, &probability) in &self.probabilities {
            if !probability.is_finite() || probability <= 0.0 || probability > 1.0 {
                return Err(Error::InvalidProbability {
                    symbol,
                    probability,
                });
            }
        }
        let sum: f64 = self.probabilities.values().sum();
        let tolerance = TOLERANCE * self.probabilities.len() as f64;
        if (sum - 1.0).abs() > tolerance {
            return Err(Error::ProbabilitySum { sum, tolerance });
        }
        Ok(())
    }

    /// Probability of `symbol`, if it occurs.
    pub fn probability(&self, symbol: u8) -> Option<f64> {
        self.probabilities.get(&symbol).copied()
    }

    /// Symbols and probabilities in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.probabilities.iter().map(|(&s, &p)| (s, p))
    }

    /// Number of symbols with nonzero probability.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// True if the model has no symbols.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Smallest probability in the model.
    pub fn min_probability(&self) -> Option<f64> {
        self.probabilities.values().copied().reduce(f64::min)
    }

    /// Largest block size that stays within `SAFE_PRECISION_BITS`.
    ///
    /// A block of `n` rarest symbols narrows the interval to `min_p^n`; this
    /// is the largest `n` keeping that width above `2^-SAFE_PRECISION_BITS`.
    /// A single-symbol model never narrows, so any size is safe.
    pub fn max_safe_block_size(&self) -> usize {
        let min_p = match self.min_probability() {
            Some(p) => p,
            None => return 0,
        };
        if min_p >= 1.0 {
            return usize::MAX;
        }
        let bits_per_symbol = -min_p.log2();
        ((SAFE_PRECISION_BITS / bits_per_symbol).floor() as usize).max(1)
    }
}
