//! Line-oriented parsing of weighted grammar files
use std::str::FromStr;

use crate::errors::FormatError;
use crate::grammar::GrammarTable;
use crate::rules::{Rhs, Rule};

impl FromStr for GrammarTable {
  type Err = FormatError;

  /// Parses `<LHS> <RHS symbols...> <weight>` lines. Blank lines are skipped;
  /// the first malformed line fails the whole grammar.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let rules = s
      .lines()
      .enumerate()
      .filter(|(_, line)| !line.trim().is_empty())
      .map(|(idx, line)| parse_rule(idx + 1, line))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self::new(rules))
  }
}

/// Parses a single non-blank line. `line_no` is 1-based, for error messages.
pub fn parse_rule(line_no: usize, line: &str) -> Result<Rule, FormatError> {
  let fields = line.split_whitespace().collect::<Vec<_>>();

  let (lhs, rest) = match fields.split_first() {
    Some((lhs, rest)) if !rest.is_empty() => (*lhs, rest),
    _ => return Err(FormatError::MissingWeight { line: line_no }),
  };

  let (weight_text, rhs) = match rest.split_last() {
    Some(split) => split,
    None => return Err(FormatError::MissingWeight { line: line_no }),
  };

  let weight = parse_weight(line_no, weight_text)?;

  let rhs = Rhs::from_symbols(rhs).ok_or(FormatError::EmptyRhs { line: line_no })?;

  Ok(Rule::new(lhs, rhs, weight))
}

fn parse_weight(line_no: usize, text: &str) -> Result<f64, FormatError> {
  let weight = text
    .parse::<f64>()
    .map_err(|_| FormatError::InvalidWeight {
      line: line_no,
      text: text.to_string(),
    })?;

  if weight.is_nan() || weight > 0.0 {
    Err(FormatError::NotLogProbability {
      line: line_no,
      weight,
    })
  } else {
    Ok(weight)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_grammar() {
    let g: GrammarTable = r#"
      S NP VP 0.0
      NP dog -0.6931471805599453
      NP <UNK> -0.6931471805599453

      VP runs 0
    "#
    .parse()
    .unwrap();

    assert_eq!(g.len(), 3);
    assert_eq!(g.rule_count(), 4);
    assert_eq!(g.producers("NP VP", 0.0), vec![("S", 0.0)]);
    assert!(g.alternatives("NP").unwrap()[1].rhs.is_unknown());
    assert!((g.mass("NP").unwrap() - 1.0).abs() < 1e-9);
  }

  #[test]
  fn test_missing_weight() {
    assert_eq!(
      "S NP VP 0\nNP".parse::<GrammarTable>().unwrap_err(),
      FormatError::MissingWeight { line: 2 }
    );
  }

  #[test]
  fn test_invalid_weight_aborts_load() {
    let err = "NP dog -1\nVP runs\nVP walks -1"
      .parse::<GrammarTable>()
      .unwrap_err();
    assert_eq!(
      err,
      FormatError::InvalidWeight {
        line: 2,
        text: "runs".to_string()
      }
    );
  }

  #[test]
  fn test_empty_rhs() {
    assert_eq!(
      "NP -0.5".parse::<GrammarTable>().unwrap_err(),
      FormatError::EmptyRhs { line: 1 }
    );
  }

  #[test]
  fn test_positive_weight() {
    assert!(matches!(
      parse_rule(3, "NP dog 0.5"),
      Err(FormatError::NotLogProbability { line: 3, .. })
    ));
    assert!(matches!(
      parse_rule(1, "NP dog NaN"),
      Err(FormatError::NotLogProbability { .. })
    ));
  }

  #[test]
  fn test_display_round_trip() {
    let src = "S NP VP 0\nNP dog -0.5\nNP <UNK> -0.9\nVP runs 0\n";
    let g: GrammarTable = src.parse().unwrap();
    assert_eq!(g.to_string(), src);
  }
}
