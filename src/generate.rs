use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::errors::GenerationError;
use crate::grammar::{Alternative, GrammarTable};
use crate::rules::Rhs;

/// Generation gives up once recursion goes deeper than this
pub const MAX_DEPTH: usize = 20;

/// Conventional start symbol of treebank grammars
pub const DEFAULT_START: &str = "S";

/// Samples sentences top-down from a borrowed grammar, choosing uniformly
/// among each symbol's alternatives. Rule weights are not used. A single-symbol
/// rhs is a word unless it is itself a left-hand side, in which case it is
/// expanded like any other child.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'g> {
  grammar: &'g GrammarTable,
}

impl<'g> Generator<'g> {
  pub fn new(grammar: &'g GrammarTable) -> Self {
    Self { grammar }
  }

  /// Generates the words of one `symbol` phrase, or fails if any branch
  /// recursed past [`MAX_DEPTH`]. A failure anywhere fails the whole call.
  pub fn generate<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    symbol: &str,
    depth: usize,
  ) -> Result<Vec<&'g str>, GenerationError> {
    if depth > MAX_DEPTH {
      return Err(GenerationError::DepthExceeded { depth });
    }

    let candidates = self
      .grammar
      .alternatives(symbol)
      .unwrap_or_default()
      .iter()
      .filter(|alt| !alt.rhs.is_unknown())
      .collect::<Vec<_>>();

    let chosen: &'g Alternative = *candidates
      .choose(rng)
      .ok_or_else(|| GenerationError::NoAlternatives {
        symbol: symbol.to_string(),
      })?;

    match &chosen.rhs {
      Rhs::Word(w) if self.grammar.is_nonterminal(w) => self.generate(rng, w, depth + 1),
      Rhs::Word(w) => Ok(vec![w.as_str()]),
      Rhs::Phrase(children) => {
        let mut words = Vec::new();
        for child in children {
          words.extend(self.generate(rng, child, depth + 1)?);
        }
        Ok(words)
      }
      // filtered out above
      Rhs::Unknown => Err(GenerationError::NoAlternatives {
        symbol: symbol.to_string(),
      }),
    }
  }

  /// Generates one space-joined sentence from `start`
  pub fn sentence<R: Rng + ?Sized>(&self, rng: &mut R, start: &str) -> Result<String, GenerationError> {
    self.generate(rng, start, 0).map(|words| words.join(" "))
  }

  /// Collects `count` distinct sentences, in the order they were first found.
  /// Failed attempts are discarded. Stops early, with fewer sentences, after
  /// `max_attempts` calls so a grammar with a small language can't loop forever.
  pub fn generate_language<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    start: &str,
    count: usize,
    max_attempts: usize,
  ) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut language = Vec::with_capacity(count);
    let mut failures = 0;

    for _ in 0..max_attempts {
      if language.len() >= count {
        break;
      }
      match self.sentence(rng, start) {
        Ok(sentence) => {
          if seen.insert(sentence.clone()) {
            language.push(sentence);
          }
        }
        Err(_) => failures += 1,
      }
    }

    if language.len() < count {
      warn!(
        wanted = count,
        found = language.len(),
        max_attempts,
        "ran out of generation attempts"
      );
    }
    debug!(sentences = language.len(), failures, "generated language");

    language
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  fn grammar() -> GrammarTable {
    r#"
      S NP VP 0
      NP dog -0.6931471805599453
      NP cat -0.6931471805599453
      VP runs -1.0986122886681098
      VP sleeps -1.0986122886681098
      VP <UNK> -1.0986122886681098
    "#
    .parse()
    .unwrap()
  }

  #[test]
  fn test_generate_sentence() {
    let g = grammar();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
      let words = g.generator().generate(&mut rng, "S", 0).unwrap();
      assert_eq!(words.len(), 2);
      assert!(["dog", "cat"].contains(&words[0]));
      assert!(["runs", "sleeps"].contains(&words[1]));
    }
  }

  #[test]
  fn test_depth_limit() {
    let g = grammar();
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
      g.generator().generate(&mut rng, "S", MAX_DEPTH + 1),
      Err(GenerationError::DepthExceeded { depth: MAX_DEPTH + 1 })
    );
    // a terminal choice at exactly the limit still succeeds
    assert!(g.generator().generate(&mut rng, "NP", MAX_DEPTH).is_ok());
  }

  #[test]
  fn test_unary_nonterminal_is_expanded() {
    let g: GrammarTable = r#"
      S NP VP 0
      NP NN 0
      NN dog 0
      VP runs 0
    "#
    .parse()
    .unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    assert_eq!(g.generator().generate(&mut rng, "S", 0), Ok(vec!["dog", "runs"]));

    // a unary cycle never reaches a word
    let g: GrammarTable = "S S 0".parse().unwrap();
    assert_eq!(
      g.generator().generate(&mut rng, "S", 0),
      Err(GenerationError::DepthExceeded { depth: MAX_DEPTH + 1 })
    );
  }

  #[test]
  fn test_runaway_recursion_fails_whole_sentence() {
    let g: GrammarTable = "S S S 0".parse().unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
      g.generator().generate(&mut rng, "S", 0),
      Err(GenerationError::DepthExceeded { .. })
    ));
  }

  #[test]
  fn test_unknown_bucket_is_never_emitted() {
    let g: GrammarTable = "NN <UNK> 0".parse().unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(
      g.generator().generate(&mut rng, "NN", 0),
      Err(GenerationError::NoAlternatives {
        symbol: "NN".to_string()
      })
    );
    assert!(g.generator().generate(&mut rng, "VP", 0).is_err());
  }

  #[test]
  fn test_eventually_generates_with_recursive_grammar() {
    // half of all S expansions recurse, so plenty of attempts blow the depth limit
    let g: GrammarTable = "S S S -0.6931471805599453\nS x -0.6931471805599453"
      .parse()
      .unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let generator = g.generator();
    let successes = (0..10_000)
      .filter(|_| generator.generate(&mut rng, "S", 0).is_ok())
      .count();
    assert!(successes > 0);
  }

  #[test]
  fn test_generate_language_distinct() {
    let g = grammar();
    let mut rng = StdRng::seed_from_u64(11);
    let language = g.generator().generate_language(&mut rng, DEFAULT_START, 4, 10_000);
    assert_eq!(language.len(), 4);
    let distinct = language.iter().collect::<HashSet<_>>();
    assert_eq!(distinct.len(), 4);
  }

  #[test]
  fn test_generate_language_attempt_ceiling() {
    let g = grammar();
    let mut rng = StdRng::seed_from_u64(5);
    // only four sentences exist
    let language = g.generator().generate_language(&mut rng, "S", 10, 500);
    assert_eq!(language.len(), 4);
  }
}
