//! Error types for grammar loading, treebank reading and generation.

use std::path::PathBuf;

/// A malformed line in a weighted grammar file. Any of these aborts the whole load.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
  /// The line has a left-hand side but nothing after it
  #[error("line {line}: missing weight")]
  MissingWeight { line: usize },

  /// The last field of the line doesn't parse as a float
  #[error("line {line}: invalid weight {text:?}")]
  InvalidWeight { line: usize, text: String },

  /// The line has a left-hand side and a weight but no right-hand side
  #[error("line {line}: empty right-hand side")]
  EmptyRhs { line: usize },

  /// Weights are natural-log probabilities, so they must be <= 0
  #[error("line {line}: weight {weight} is not a log-probability")]
  NotLogProbability { line: usize, weight: f64 },
}

/// Errors from reading a grammar off disk.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
  #[error("couldn't read grammar file {path}: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error(transparent)]
  Format(#[from] FormatError),
}

/// Errors from reading a bracketed treebank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreebankError {
  #[error("unbalanced brackets at token {position}")]
  UnbalancedBrackets { position: usize },

  #[error("constituent without a label at token {position}")]
  MissingLabel { position: usize },

  #[error("word {word:?} outside of any constituent at token {position}")]
  StrayWord { word: String, position: usize },

  #[error("constituent {label} has no children")]
  EmptyConstituent { label: String },

  #[error("constituent {label} mixes words and sub-constituents")]
  MixedChildren { label: String },
}

/// Why a call to [`crate::generate::Generator::generate`] produced no sentence.
/// Both are recoverable: callers are free to retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
  #[error("recursion depth {depth} exceeded the limit")]
  DepthExceeded { depth: usize },

  #[error("no emittable alternatives for symbol {symbol}")]
  NoAlternatives { symbol: String },
}
