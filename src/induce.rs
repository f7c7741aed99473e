use std::collections::HashMap;

use tracing::{debug, warn};

use crate::grammar::GrammarTable;
use crate::rules::{Rhs, Rule, UNK};
use crate::treebank::{PhraseRule, RuleSource};

/// Counts for one lhs, rhs in first-seen order
#[derive(Debug, Default)]
struct LhsCounts {
  lhs: String,
  rhs_index: HashMap<Vec<String>, usize>,
  counts: Vec<(Vec<String>, u64)>,
}

impl LhsCounts {
  fn observe(&mut self, rhs: Vec<String>) {
    match self.rhs_index.get(&rhs) {
      Some(&idx) => self.counts[idx].1 += 1,
      None => {
        self.rhs_index.insert(rhs.clone(), self.counts.len());
        self.counts.push((rhs, 1));
      }
    }
  }

  /// Singleton words move into `<UNK>`, singleton phrases are dropped, and the
  /// remaining counts are normalized into log-probabilities.
  fn into_rules(self) -> Vec<Rule> {
    let mut kept: Vec<(Rhs, u64)> = Vec::with_capacity(self.counts.len());
    let mut unknown = 0;

    for (symbols, count) in self.counts {
      let is_word = symbols.len() == 1;
      if count == 1 {
        if is_word {
          unknown += 1;
        }
        continue;
      }
      match Rhs::from_symbols(symbols.as_slice()) {
        // a literal <UNK> in the corpus lands in the same bucket
        Some(Rhs::Unknown) => unknown += count,
        Some(rhs) => kept.push((rhs, count)),
        None => {}
      }
    }

    if unknown > 0 {
      kept.push((Rhs::Unknown, unknown));
    }

    let total: u64 = kept.iter().map(|(_, c)| c).sum();
    if total == 0 {
      debug!(lhs = %self.lhs, "every rule was a singleton phrase, dropping lhs");
      return Vec::new();
    }

    kept
      .into_iter()
      .map(|(rhs, count)| Rule::new(self.lhs.clone(), rhs, (count as f64 / total as f64).ln()))
      .collect()
  }
}

/// Accumulates phrase-rule counts from a corpus and turns them into a
/// [`GrammarTable`].
///
/// Repeated rules always add to their count. When the table is built, every
/// word seen exactly once under some lhs gives its count to that lhs's
/// `<UNK>` bucket, and every multi-symbol rule seen exactly once is dropped.
#[derive(Debug, Default)]
pub struct GrammarInducer {
  lhs_index: HashMap<String, usize>,
  entries: Vec<LhsCounts>,
  observed: usize,
}

impl GrammarInducer {
  pub fn new() -> Self {
    Default::default()
  }

  /// Counts one occurrence of `lhs -> rhs`
  pub fn observe(&mut self, lhs: &str, rhs: Vec<String>) {
    if rhs.is_empty() {
      warn!(lhs, "ignoring rule with an empty right-hand side");
      return;
    }

    let idx = match self.lhs_index.get(lhs) {
      Some(&idx) => idx,
      None => {
        self.lhs_index.insert(lhs.to_string(), self.entries.len());
        self.entries.push(LhsCounts {
          lhs: lhs.to_string(),
          ..Default::default()
        });
        self.entries.len() - 1
      }
    };

    self.entries[idx].observe(rhs);
    self.observed += 1;
  }

  pub fn add_rule(&mut self, rule: PhraseRule) {
    self.observe(&rule.lhs, rule.rhs);
  }

  pub fn add_rules<I: IntoIterator<Item = PhraseRule>>(&mut self, rules: I) {
    for rule in rules {
      self.add_rule(rule);
    }
  }

  /// Counts every phrase rule of a tree (or of a slice of trees)
  pub fn add_source<T: RuleSource + ?Sized>(&mut self, source: &T) {
    self.add_rules(source.phrase_rules());
  }

  /// Number of rule occurrences observed so far
  pub fn observed(&self) -> usize {
    self.observed
  }

  /// Current count of `lhs -> rhs`, before any smoothing
  pub fn count(&self, lhs: &str, rhs: &[&str]) -> u64 {
    self
      .lhs_index
      .get(lhs)
      .and_then(|&idx| {
        let entry = &self.entries[idx];
        entry
          .counts
          .iter()
          .find(|(symbols, _)| symbols.iter().map(String::as_str).eq(rhs.iter().copied()))
          .map(|(_, c)| *c)
      })
      .unwrap_or(0)
  }

  pub fn build(self) -> GrammarTable {
    debug!(
      observed = self.observed,
      nonterminals = self.entries.len(),
      "inducing grammar"
    );
    GrammarTable::new(self.entries.into_iter().flat_map(LhsCounts::into_rules))
  }
}

/// Induces a grammar straight from a sequence of phrase rules
pub fn induce_grammar<I: IntoIterator<Item = PhraseRule>>(rules: I) -> GrammarTable {
  let mut inducer = GrammarInducer::new();
  inducer.add_rules(rules);
  inducer.build()
}
