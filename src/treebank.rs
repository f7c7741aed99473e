//! A small reader for Penn-style bracketed treebanks, and phrase-rule
//! extraction from the trees it produces.

use regex::Regex;
use tracing::debug;

use crate::errors::TreebankError;
use crate::syntree::{Constituent, SynTree, Word};

/// Label of the optional wrapper bracket around each treebank tree
pub const TOP_LABEL: &str = "TOP";

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

/// A phrase-structure rule read off a tree: a label and its children's labels,
/// or the word under a preterminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhraseRule {
  pub lhs: String,
  pub rhs: Vec<String>,
}

impl PhraseRule {
  pub fn new<S: Into<String>>(lhs: impl Into<String>, rhs: impl IntoIterator<Item = S>) -> Self {
    Self {
      lhs: lhs.into(),
      rhs: rhs.into_iter().map(Into::into).collect(),
    }
  }
}

/// Anything that can supply the phrase rules a grammar is induced from
pub trait RuleSource {
  fn phrase_rules(&self) -> Vec<PhraseRule>;
}

impl RuleSource for SynTree<String, String> {
  /// Rules in post-order: a constituent's rule follows the rules of its children
  fn phrase_rules(&self) -> Vec<PhraseRule> {
    let mut rules = Vec::new();
    collect_rules(self, &mut rules);
    rules
  }
}

impl<T: RuleSource> RuleSource for [T] {
  fn phrase_rules(&self) -> Vec<PhraseRule> {
    self.iter().flat_map(|t| t.phrase_rules()).collect()
  }
}

fn collect_rules(node: &SynTree<String, String>, rules: &mut Vec<PhraseRule>) {
  if let SynTree::Branch(cons, children) = node {
    let mut rhs = Vec::with_capacity(children.len());
    for child in children {
      match child {
        SynTree::Leaf(w) => rhs.push(w.value.clone()),
        SynTree::Branch(c, _) => {
          rhs.push(c.value.clone());
          collect_rules(child, rules);
        }
      }
    }
    rules.push(PhraseRule {
      lhs: cons.value.clone(),
      rhs,
    });
  }
}

/// Strips function tags and indices: `NP-SBJ-1` -> `NP`, `NP=2` -> `NP`.
/// Labels starting with `-`, like `-NONE-`, are left alone.
pub fn primary_tag(label: &str) -> &str {
  if label.starts_with('-') {
    return label;
  }
  match label.find(['-', '=']) {
    Some(0) | None => label,
    Some(idx) => &label[..idx],
  }
}

fn tokenize(s: &str) -> Vec<&str> {
  regex_static!(TOKEN, r"[()]|[^()\s]+");
  TOKEN.find_iter(s).map(|m| m.as_str()).collect()
}

/// A constituent still waiting for its closing bracket
struct Open {
  label: String,
  start: usize,
  children: Vec<SynTree<String, String>>,
}

impl Open {
  fn close(self, end: usize) -> Result<SynTree<String, String>, TreebankError> {
    if self.children.is_empty() {
      return Err(TreebankError::EmptyConstituent { label: self.label });
    }
    let leaves = self.children.iter().filter(|c| c.is_leaf()).count();
    if leaves > 0 && (leaves > 1 || self.children.len() > 1) {
      return Err(TreebankError::MixedChildren { label: self.label });
    }
    Ok(SynTree::Branch(
      Constituent {
        value: self.label,
        span: (self.start, end),
      },
      self.children,
    ))
  }
}

/// Reads every tree in a bracketed treebank.
///
/// A bracket with no label, or labelled `TOP`, is a wrapper: each constituent
/// inside it becomes its own tree. Text outside of brackets is ignored.
pub fn read_treebank(s: &str) -> Result<Vec<SynTree<String, String>>, TreebankError> {
  let tokens = tokenize(s);
  let mut trees = Vec::new();
  // None marks a wrapper bracket
  let mut stack: Vec<Option<Open>> = Vec::new();
  let mut word_idx = 0;
  let mut pos = 0;

  while pos < tokens.len() {
    let token = tokens[pos];
    match token {
      "(" => {
        let label = tokens.get(pos + 1).copied();
        let at_root = stack.is_empty();
        match label {
          Some("(") if at_root => {
            stack.push(None);
            pos += 1;
          }
          Some(l) if at_root && l == TOP_LABEL => {
            stack.push(None);
            pos += 2;
          }
          Some(l) if l != "(" && l != ")" => {
            stack.push(Some(Open {
              label: primary_tag(l).to_string(),
              start: word_idx,
              children: Vec::new(),
            }));
            pos += 2;
          }
          _ => return Err(TreebankError::MissingLabel { position: pos }),
        }
      }
      ")" => {
        let closed = stack
          .pop()
          .ok_or(TreebankError::UnbalancedBrackets { position: pos })?;
        if let Some(open) = closed {
          let tree = open.close(word_idx)?;
          match stack.last_mut() {
            Some(Some(parent)) => parent.children.push(tree),
            // top-level constituent, either bare or inside a wrapper
            Some(None) | None => {
              trees.push(tree);
              word_idx = 0;
            }
          }
        }
        pos += 1;
      }
      word => {
        match stack.last_mut() {
          Some(Some(open)) => {
            open.children.push(SynTree::Leaf(Word {
              value: word.to_string(),
              span: (word_idx, word_idx + 1),
            }));
            word_idx += 1;
          }
          Some(None) => {
            return Err(TreebankError::StrayWord {
              word: word.to_string(),
              position: pos,
            });
          }
          // outside of any tree
          None => {}
        }
        pos += 1;
      }
    }
  }

  if !stack.is_empty() {
    return Err(TreebankError::UnbalancedBrackets { position: pos });
  }

  debug!(trees = trees.len(), "read treebank");
  Ok(trees)
}
