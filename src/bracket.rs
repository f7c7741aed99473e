//! Bracket-string rendering of parse trees.

use std::fmt::{self, Write};

use crate::parser::Parse;
use crate::syntree::SynTree;

/// Renders `(label child1 child2 ...)` recursively. Words are written bare, so
/// a preterminal comes out as `(NN dog)`. Single spaces, no trailing whitespace.
pub fn to_bracket_string<T, U>(tree: &SynTree<T, U>) -> String
where
  T: fmt::Display,
  U: fmt::Display,
{
  tree.to_string()
}

pub(crate) fn write_bracketed<W, T, U>(out: &mut W, tree: &SynTree<T, U>) -> fmt::Result
where
  W: Write,
  T: fmt::Display,
  U: fmt::Display,
{
  match tree {
    SynTree::Leaf(w) => write!(out, "{}", w.value),
    SynTree::Branch(cons, children) => {
      write!(out, "({}", cons.value)?;
      for child in children {
        out.write_char(' ')?;
        write_bracketed(out, child)?;
      }
      out.write_char(')')
    }
  }
}

/// Output for a sentence without a derivation: every token in its own bracket
/// pair, in order, with no label above them.
pub fn flat_bracket_string<S: AsRef<str>>(tokens: &[S]) -> String {
  let inner = tokens
    .iter()
    .map(|t| format!("({})", t.as_ref()))
    .collect::<Vec<_>>()
    .join(" ");
  format!("({})", inner)
}

/// One output line for a sentence: the tree if there is one, else the flat fallback
pub fn render_parse<S: AsRef<str>>(tokens: &[S], parse: Option<&Parse>) -> String {
  match parse {
    Some(parse) => to_bracket_string(&parse.tree),
    None => flat_bracket_string(tokens),
  }
}
