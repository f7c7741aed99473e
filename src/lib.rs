#[macro_use]
extern crate lazy_static;

pub mod bracket;
pub mod cyk;
pub mod errors;
pub mod generate;
pub mod grammar;
pub mod induce;
pub mod parse_grammar;
pub mod parser;
pub mod rules;
pub mod syntree;
pub mod treebank;
pub mod utils;

pub use crate::bracket::{flat_bracket_string, render_parse, to_bracket_string};
pub use crate::errors::{FormatError, GenerationError, GrammarError, TreebankError};
pub use crate::generate::Generator;
pub use crate::grammar::GrammarTable;
pub use crate::induce::{induce_grammar, GrammarInducer};
pub use crate::parser::{ChartParser, Parse};
pub use crate::syntree::{DerivationTree, SynTree};
pub use crate::treebank::{read_treebank, PhraseRule, RuleSource};
pub use crate::utils::Err;

#[test]
fn test_train_then_parse() {
  let treebank = r#"
    ((S (NP (DT the) (NN dog)) (VP barks)))
    ((S (NP (DT the) (NN dog)) (VP sleeps)))
    ((S (NP (DT the) (NN cat)) (VP sleeps)))
    ((S (NP (DT a) (NN cat)) (VP barks)))
    ((S (NP (DT a) (NN bird)) (VP sings)))
  "#;

  let trees = read_treebank(treebank).unwrap();
  let mut inducer = GrammarInducer::new();
  inducer.add_source(trees.as_slice());
  let g = inducer.build();

  // the induced grammar survives a trip through the file format
  let g: GrammarTable = g.to_string().parse().unwrap();
  let parser = g.parser();

  let parse = parser.parse(&["the", "cat", "barks"]).unwrap();
  assert_eq!(
    to_bracket_string(&parse.tree),
    "(S (NP (DT the) (NN cat)) (VP barks))"
  );

  // "bird" and "sings" were seen once, so they only parse through <UNK>,
  // as does a word never seen at all
  let parse = parser.parse(&["a", "zebra", "sings"]).unwrap();
  assert_eq!(
    to_bracket_string(&parse.tree),
    "(S (NP (DT a) (NN zebra)) (VP sings))"
  );

  let tokens = ["barks", "the"];
  let parse = parser.parse(&tokens);
  assert!(parse.is_none());
  assert_eq!(render_parse(&tokens, parse.as_ref()), "((barks) (the))");
}
