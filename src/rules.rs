use std::fmt;

/// Reserved right-hand side that holds the probability mass of words never seen in training
pub const UNK: &str = "<UNK>";

/// Right-hand side of a weighted rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
  /// The `<UNK>` bucket of its left-hand side. Never emitted by generation.
  Unknown,
  /// A single symbol: a terminal word, or a unary non-terminal if it is also some rule's lhs
  Word(String),
  /// Two or more non-terminals. Only the binary case can be matched by the chart parser.
  Phrase(Vec<String>),
}

impl Rhs {
  /// Builds an rhs from its symbols. Returns None for an empty slice.
  pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Option<Self> {
    match symbols {
      [] => None,
      [single] if single.as_ref() == UNK => Some(Self::Unknown),
      [single] => Some(Self::Word(single.as_ref().to_string())),
      many => Some(Self::Phrase(
        many.iter().map(|s| s.as_ref().to_string()).collect(),
      )),
    }
  }

  /// The rhs rendered as its symbols joined by single spaces, which is how
  /// the chart parser looks rules up.
  pub fn key(&self) -> String {
    match self {
      Self::Unknown => UNK.to_string(),
      Self::Word(w) => w.clone(),
      Self::Phrase(symbols) => symbols.join(" "),
    }
  }

  pub fn is_unknown(&self) -> bool {
    matches!(self, Self::Unknown)
  }
}

impl fmt::Display for Rhs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unknown => write!(f, "{}", UNK),
      Self::Word(w) => write!(f, "{}", w),
      Self::Phrase(symbols) => {
        for (idx, s) in symbols.iter().enumerate() {
          if idx > 0 {
            write!(f, " ")?;
          }
          write!(f, "{}", s)?;
        }
        Ok(())
      }
    }
  }
}

/// A weighted production. `weight` is a natural-log probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub lhs: String,
  pub rhs: Rhs,
  pub weight: f64,
}

impl Rule {
  pub fn new(lhs: impl Into<String>, rhs: Rhs, weight: f64) -> Self {
    Self {
      lhs: lhs.into(),
      rhs,
      weight,
    }
  }
}

/// Same layout as a line of a weighted grammar file
impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {}", self.lhs, self.rhs, self.weight)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rhs_from_symbols() {
    assert_eq!(Rhs::from_symbols::<&str>(&[]), None);
    assert_eq!(Rhs::from_symbols(&["<UNK>"]), Some(Rhs::Unknown));
    assert_eq!(Rhs::from_symbols(&["dog"]), Some(Rhs::Word("dog".to_string())));
    assert_eq!(
      Rhs::from_symbols(&["NP", "VP"]).map(|r| r.key()),
      Some("NP VP".to_string())
    );
  }

  #[test]
  fn test_rule_display() {
    let rule = Rule::new("S", Rhs::from_symbols(&["NP", "VP"]).unwrap(), -0.5);
    assert_eq!(rule.to_string(), "S NP VP -0.5");
    assert_eq!(Rule::new("NN", Rhs::Unknown, 0.0).to_string(), "NN <UNK> 0");
  }
}
