//! Line-oriented configuration.
//!
//! Each line is `<key> <value...>`, tokens separated by spaces, tabs, `:` or
//! `=`. Blank lines and `#` comments are skipped. The same vocabulary is
//! used for model files (see [`crate::persist`]).
//!
//! ```text
//! target encode
//! num 8
//! table model.txt
//! prob 65 0.5
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::ProbabilityModel;

/// What a run should do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Target {
    /// Bytes to codes.
    #[default]
    Encode,
    /// Codes to bytes.
    Decode,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "encode" => Ok(Target::Encode),
            "decode" => Ok(Target::Decode),
            other => Err(format!("unknown target `{other}`, expected encode|decode")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Key {
    BlockSize,
    TextLen,
    Probability,
    Table,
    Target,
}

impl Key {
    /// Values following the key on its line.
    fn arity(self) -> usize {
        match self {
            Key::Probability => 2,
            _ => 1,
        }
    }
}

pub(crate) const KEY_BLOCK_SIZE: &str = "num";
pub(crate) const KEY_TEXT_LEN: &str = "len";
pub(crate) const KEY_PROBABILITY: &str = "prob";
pub(crate) const KEY_TABLE: &str = "table";

const KEYS: &[(&str, Key)] = &[
    (KEY_BLOCK_SIZE, Key::BlockSize),
    (KEY_TEXT_LEN, Key::TextLen),
    (KEY_PROBABILITY, Key::Probability),
    ("decconf", Key::Table),
    (KEY_TABLE, Key::Table),
    ("target", Key::Target),
];

fn lookup_key(name: &str) -> Option<Key> {
    KEYS.iter().find(|(k, _)| *k == name).map(|&(_, key)| key)
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t' || c == ':' || c == '='
}

fn parse_value<T: FromStr>(line: usize, what: &str, text: &str) -> Result<T> {
    text.parse()
        .map_err(|_| Error::config(line, format!("invalid {what} `{text}`")))
}

/// Symbols may be spelled unsigned (0..=255) or as signed bytes (-128..=-1).
fn parse_symbol(line: usize, text: &str) -> Result<u8> {
    let value: i16 = parse_value(line, "symbol", text)?;
    if !(-128..=255).contains(&value) {
        return Err(Error::config(line, format!("symbol {value} out of byte range")));
    }
    Ok(value as u8)
}

/// Parsed configuration. Every field is optional at parse time; operations
/// check for what they need.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Symbols per code (`num`).
    pub block_size: Option<usize>,
    /// Total symbols (`len`).
    pub text_len: Option<usize>,
    /// Inline model entries (`prob`), in file order.
    pub probabilities: Vec<(u8, f64)>,
    /// Model file path (`table` or `decconf`).
    pub table: Option<PathBuf>,
    /// Requested operation (`target`).
    pub target: Target,
}

impl Config {
    /// Read a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse configuration lines.
    ///
    /// # Errors
    /// `Error::Config` for an unknown key, wrong number of values, bad
    /// number, zero block size, unknown target or repeated `prob` symbol.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut config = Config::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            config.apply_line(i + 1, &line)?;
        }
        Ok(config)
    }

    fn apply_line(&mut self, lineno: usize, line: &str) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }
        let tokens: Vec<&str> = trimmed
            .split(is_separator)
            .filter(|t| !t.is_empty())
            .collect();
        let (name, values) = tokens
            .split_first()
            .ok_or_else(|| Error::config(lineno, "empty entry"))?;
        let key = lookup_key(name)
            .ok_or_else(|| Error::config(lineno, format!("unknown key `{name}`")))?;
        if values.len() != key.arity() {
            return Err(Error::config(
                lineno,
                format!(
                    "`{name}` takes {} value(s), found {}",
                    key.arity(),
                    values.len()
                ),
            ));
        }

        match key {
            Key::BlockSize => {
                let n: usize = parse_value(lineno, "block size", values[0])?;
                if n == 0 {
                    return Err(Error::config(lineno, "block size must be positive"));
                }
                self.block_size = Some(n);
            }
            Key::TextLen => {
                self.text_len = Some(parse_value(lineno, "text length", values[0])?);
            }
            Key::Probability => {
                let symbol = parse_symbol(lineno, values[0])?;
                let p: f64 = parse_value(lineno, "probability", values[1])?;
                if self.probabilities.iter().any(|&(s, _)| s == symbol) {
                    return Err(Error::config(
                        lineno,
                        format!("duplicate probability for symbol {symbol}"),
                    ));
                }
                self.probabilities.push((symbol, p));
            }
            Key::Table => self.table = Some(PathBuf::from(values[0])),
            Key::Target => {
                self.target = values[0]
                    .parse()
                    .map_err(|reason: String| Error::config(lineno, reason))?;
            }
        }
        Ok(())
    }

    /// Block size, or `Error::MissingKey`.
    pub fn require_block_size(&self) -> Result<usize> {
        self.block_size.ok_or(Error::MissingKey(KEY_BLOCK_SIZE))
    }

    /// Text length, or `Error::MissingKey`.
    pub fn require_text_len(&self) -> Result<usize> {
        self.text_len.ok_or(Error::MissingKey(KEY_TEXT_LEN))
    }

    /// Model file path, or `Error::MissingKey`.
    pub fn require_table(&self) -> Result<&Path> {
        self.table.as_deref().ok_or(Error::MissingKey(KEY_TABLE))
    }

    /// Validated model from the inline `prob` entries, if there are any.
    pub fn model(&self) -> Result<Option<ProbabilityModel>> {
        if self.probabilities.is_empty() {
            return Ok(None);
        }
        ProbabilityModel::from_probabilities(self.probabilities.iter().copied()).map(Some)
    }
}
