use std::fmt;

use crate::bracket::write_bracketed;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

/// A phrase-structure tree. Branches are labelled constituents; leaves are the
/// surface words. A preterminal is a branch with a single leaf child.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

/// The tree the chart parser extracts: labelled by symbol, leaves are tokens
pub type DerivationTree = SynTree<String, String>;

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  /// True for a branch whose only child is a word
  pub fn is_preterminal(&self) -> bool {
    match self {
      Self::Branch(_, children) => children.len() == 1 && children[0].is_leaf(),
      _ => false,
    }
  }

  /// The words under this tree, left to right
  pub fn leaves(&self) -> Vec<&U> {
    let mut words = Vec::new();
    let mut stack = vec![self];
    while let Some(node) = stack.pop() {
      match node {
        Self::Leaf(w) => words.push(&w.value),
        // reversed so the leftmost child is popped first
        Self::Branch(_, children) => stack.extend(children.iter().rev()),
      }
    }
    words
  }
}

/// Renders the tree as a bracket string, see [`crate::bracket::to_bracket_string`]
impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_bracketed(f, self)
  }
}
