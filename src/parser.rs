use tracing::debug;

use crate::cyk::{parse_chart, BackPointer, Chart, EntryRef};
use crate::grammar::GrammarTable;
use crate::syntree::{Constituent, DerivationTree, SynTree, Word};

/// The best derivation of a sentence and its total log-probability
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
  pub tree: DerivationTree,
  pub log_prob: f64,
}

/// Viterbi CYK parser over a borrowed grammar. Cheap to create; any number of
/// parsers can share one grammar.
#[derive(Debug, Clone, Copy)]
pub struct ChartParser<'g> {
  grammar: &'g GrammarTable,
}

impl<'g> ChartParser<'g> {
  pub fn new(grammar: &'g GrammarTable) -> Self {
    Self { grammar }
  }

  pub fn parse_chart<S: AsRef<str>>(&self, input: &[S]) -> Chart<'g> {
    parse_chart(self.grammar, input)
  }

  /// Returns the most probable derivation covering the whole input, or None
  /// if the grammar can't derive it. The empty input never has a derivation.
  pub fn parse<S: AsRef<str>>(&self, input: &[S]) -> Option<Parse> {
    if input.is_empty() {
      return None;
    }

    let chart = self.parse_chart(input);
    let best = chart.best(0, input.len());
    if best.is_none() {
      debug!(tokens = input.len(), "no derivation");
    }

    best.map(|root| Parse {
      tree: extract_tree(&chart, input, root),
      log_prob: chart.entry(root).log_prob,
    })
  }
}

/// Rebuilds the derivation rooted at `at` by following back-pointers
pub fn extract_tree<S: AsRef<str>>(chart: &Chart<'_>, input: &[S], at: EntryRef) -> DerivationTree {
  let entry = chart.entry(at);
  let cons = Constituent {
    value: entry.symbol.to_string(),
    span: (at.start, at.end),
  };

  let children = match entry.back {
    BackPointer::Leaf => vec![SynTree::Leaf(Word {
      value: input[at.start].as_ref().to_string(),
      span: (at.start, at.end),
    })],
    BackPointer::Split(left, right) => vec![
      extract_tree(chart, input, left),
      extract_tree(chart, input, right),
    ],
  };

  SynTree::Branch(cons, children)
}
