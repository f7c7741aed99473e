use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::GrammarError;
use crate::generate::Generator;
use crate::parser::ChartParser;
use crate::rules::{Rhs, Rule};

/// How far an lhs's probability mass may drift from 1.0 before it's reported
pub const MASS_TOLERANCE: f64 = 1e-6;

/// A weighted alternative of some lhs
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
  pub rhs: Rhs,
  pub weight: f64,
}

/// An immutable PCFG. Built once, then shared by reference between any number
/// of parsers and generators.
///
/// Everything is kept in insertion order, which makes producer lookups (and so
/// chart tie-breaking) deterministic.
#[derive(Debug, Clone, Default)]
pub struct GrammarTable {
  symbols: Vec<String>,
  alternatives: Vec<Vec<Alternative>>,
  lhs_index: HashMap<String, usize>,
  /// rhs key -> (lhs idx, weight)
  producers: HashMap<String, Vec<(usize, f64)>>,
  /// (lhs idx, weight) of every `<UNK>` bucket
  unknowns: Vec<(usize, f64)>,
}

impl GrammarTable {
  /// Builds a table from rules. A repeated (lhs, rhs) keeps its first position
  /// and takes the later weight.
  pub fn new<I>(rules: I) -> Self
  where
    I: IntoIterator<Item = Rule>,
  {
    let mut symbols: Vec<String> = Vec::new();
    let mut alternatives: Vec<Vec<Alternative>> = Vec::new();
    let mut lhs_index: HashMap<String, usize> = HashMap::new();

    for rule in rules {
      let idx = *lhs_index.entry(rule.lhs.clone()).or_insert_with(|| {
        symbols.push(rule.lhs.clone());
        alternatives.push(Vec::new());
        symbols.len() - 1
      });

      let alts = &mut alternatives[idx];
      if let Some(existing) = alts.iter_mut().find(|a| a.rhs == rule.rhs) {
        warn!(lhs = %rule.lhs, rhs = %rule.rhs, "duplicate rule, keeping the later weight");
        existing.weight = rule.weight;
      } else {
        alts.push(Alternative {
          rhs: rule.rhs,
          weight: rule.weight,
        });
      }
    }

    let mut producers: HashMap<String, Vec<(usize, f64)>> = HashMap::new();
    let mut unknowns = Vec::new();
    for (idx, alts) in alternatives.iter().enumerate() {
      for alt in alts {
        if alt.rhs.is_unknown() {
          unknowns.push((idx, alt.weight));
        } else {
          producers
            .entry(alt.rhs.key())
            .or_default()
            .push((idx, alt.weight));
        }
      }
    }

    let table = Self {
      symbols,
      alternatives,
      lhs_index,
      producers,
      unknowns,
    };

    for lhs in table.lhs_symbols() {
      if let Some(mass) = table.mass(lhs) {
        if (mass - 1.0).abs() > MASS_TOLERANCE {
          warn!(lhs, mass, "alternatives don't sum to one");
        }
      }
    }

    debug!(
      nonterminals = table.len(),
      rules = table.rule_count(),
      unknown_buckets = table.unknowns.len(),
      "built grammar table"
    );

    table
  }

  /// Reads a weighted grammar file
  pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GrammarError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| GrammarError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(text.parse()?)
  }

  /// Number of left-hand sides
  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }

  /// Total number of alternatives, `<UNK>` buckets included
  pub fn rule_count(&self) -> usize {
    self.alternatives.iter().map(Vec::len).sum()
  }

  /// Left-hand sides in insertion order
  pub fn lhs_symbols(&self) -> impl Iterator<Item = &str> {
    self.symbols.iter().map(String::as_str)
  }

  pub fn is_nonterminal(&self, symbol: &str) -> bool {
    self.lhs_index.contains_key(symbol)
  }

  pub fn alternatives(&self, lhs: &str) -> Option<&[Alternative]> {
    self
      .lhs_index
      .get(lhs)
      .map(|&idx| self.alternatives[idx].as_slice())
  }

  /// Sum of the linear-space probabilities of `lhs`'s alternatives
  pub fn mass(&self, lhs: &str) -> Option<f64> {
    self
      .alternatives(lhs)
      .map(|alts| alts.iter().map(|a| a.weight.exp()).sum())
  }

  /// Every lhs that can produce `rhs_key`, paired with `base + weight`.
  ///
  /// When `rhs_key` is a single symbol that no rule produces, every `<UNK>`
  /// bucket is returned instead; this is the only handling of unseen words.
  pub fn producers(&self, rhs_key: &str, base: f64) -> Vec<(&str, f64)> {
    if let Some(found) = self.producers.get(rhs_key) {
      return found
        .iter()
        .map(|&(idx, weight)| (self.symbols[idx].as_str(), base + weight))
        .collect();
    }

    if rhs_key.split_whitespace().count() == 1 {
      self
        .unknowns
        .iter()
        .map(|&(idx, weight)| (self.symbols[idx].as_str(), base + weight))
        .collect()
    } else {
      Vec::new()
    }
  }

  /// Rules in insertion order
  pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
    self
      .symbols
      .iter()
      .zip(self.alternatives.iter())
      .flat_map(|(lhs, alts)| {
        alts
          .iter()
          .map(move |a| Rule::new(lhs.clone(), a.rhs.clone(), a.weight))
      })
  }

  pub fn parser(&self) -> ChartParser<'_> {
    ChartParser::new(self)
  }

  pub fn generator(&self) -> Generator<'_> {
    Generator::new(self)
  }
}

/// Writes the table back out in the weighted grammar file format
impl fmt::Display for GrammarTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for rule in self.rules() {
      writeln!(f, "{}", rule)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::errors::FormatError;

  fn word(w: &str) -> Rhs {
    Rhs::Word(w.to_string())
  }

  fn pair(a: &str, b: &str) -> Rhs {
    Rhs::Phrase(vec![a.to_string(), b.to_string()])
  }

  fn table() -> GrammarTable {
    GrammarTable::new(vec![
      Rule::new("S", pair("NP", "VP"), 0.0),
      Rule::new("NP", word("dog"), -0.5),
      Rule::new("NP", Rhs::Unknown, -1.0),
      Rule::new("VP", word("runs"), -0.25),
      Rule::new("NN", word("dog"), -2.0),
      Rule::new("NN", Rhs::Unknown, -5.0),
    ])
  }

  #[test]
  fn test_producers_exact_match() {
    let g = table();
    assert_eq!(g.producers("dog", 0.0), vec![("NP", -0.5), ("NN", -2.0)]);
    assert_eq!(g.producers("NP VP", -1.0), vec![("S", -1.0)]);
    assert!(g.producers("VP NP", 0.0).is_empty());
  }

  #[test]
  fn test_producers_unknown_fallback() {
    let g = table();
    assert_eq!(g.producers("cat", 0.0), vec![("NP", -1.0), ("NN", -5.0)]);
    // fallback only applies to single symbols
    assert!(g.producers("cat dog", 0.0).is_empty());
  }

  #[test]
  fn test_no_unknown_buckets() {
    let g = GrammarTable::new(vec![Rule::new("NP", word("dog"), 0.0)]);
    assert!(g.producers("cat", 0.0).is_empty());
  }

  #[test]
  fn test_duplicate_rule_keeps_position() {
    let g = GrammarTable::new(vec![
      Rule::new("NP", word("dog"), -1.0),
      Rule::new("NP", word("cat"), -1.0),
      Rule::new("NP", word("dog"), -0.5),
    ]);
    let alts = g.alternatives("NP").unwrap();
    assert_eq!(alts.len(), 2);
    assert_eq!(alts[0].rhs, word("dog"));
    assert_eq!(alts[0].weight, -0.5);
  }

  #[test]
  fn test_display_lines() {
    let g = GrammarTable::new(vec![
      Rule::new("S", pair("NP", "VP"), 0.0),
      Rule::new("NN", Rhs::Unknown, -5.0),
    ]);
    assert_eq!(g.to_string(), "S NP VP 0\nNN <UNK> -5\n");
  }

  #[test]
  fn test_lookup_helpers() {
    let g = table();
    assert_eq!(g.len(), 4);
    assert_eq!(g.rule_count(), 6);
    assert!(g.is_nonterminal("VP"));
    assert!(!g.is_nonterminal("runs"));
    assert!(g.alternatives("runs").is_none());
    assert_eq!(
      g.lhs_symbols().collect::<Vec<_>>(),
      vec!["S", "NP", "VP", "NN"]
    );
  }

  #[test]
  fn test_read_from_file() {
    let path = std::env::temp_dir().join(format!("pcfgparse-read-{}.rule", std::process::id()));
    fs::write(&path, "S NP VP 0\nNP dog -0.5\nNP <UNK> -1\n").unwrap();
    let g = GrammarTable::read_from_file(&path);
    fs::remove_file(&path).unwrap();

    let g = g.unwrap();
    assert_eq!(g.len(), 2);
    assert_eq!(g.producers("cat", 0.0), vec![("NP", -1.0)]);
  }

  #[test]
  fn test_read_from_file_errors() {
    let missing = std::env::temp_dir().join("pcfgparse-no-such-grammar.rule");
    assert!(matches!(
      GrammarTable::read_from_file(&missing),
      Err(GrammarError::Io { path, .. }) if path == missing
    ));

    let path = std::env::temp_dir().join(format!("pcfgparse-bad-{}.rule", std::process::id()));
    fs::write(&path, "S NP VP 0\nNP\n").unwrap();
    let g = GrammarTable::read_from_file(&path);
    fs::remove_file(&path).unwrap();
    assert!(matches!(
      g,
      Err(GrammarError::Format(FormatError::MissingWeight { line: 2 }))
    ));
  }

  #[test]
  fn test_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GrammarTable>();

    let g = table();
    std::thread::scope(|s| {
      let a = s.spawn(|| g.producers("dog", 0.0).len());
      let b = s.spawn(|| g.producers("runs", 0.0).len());
      assert_eq!(a.join().unwrap(), 2);
      assert_eq!(b.join().unwrap(), 1);
    });
  }
}
