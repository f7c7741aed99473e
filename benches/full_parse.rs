use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pcfgparse::GrammarTable;

const GRAMMAR_SRC: &str = r#"
S NP VP 0
NP DT NN -0.6931471805599453
NP NP PP -1.0986122886681098
NP <UNK> -1.791759469228055
VP V NP -0.6931471805599453
VP VP PP -0.6931471805599453
PP P NP 0
DT the -0.2876820724517809
DT a -1.3862943611198906
NN dog -1.0986122886681098
NN telescope -1.0986122886681098
NN park -1.0986122886681098
V saw 0
P with -0.6931471805599453
P in -0.6931471805599453
"#;

fn parse(g: &GrammarTable, input: &[&str]) -> bool {
  g.parser().parse(input).is_some()
}

fn criterion_benchmark(c: &mut Criterion) {
  let grammar = GRAMMAR_SRC.parse::<GrammarTable>().unwrap();
  let simple_input = "the dog saw a park".split(' ').collect::<Vec<_>>();
  let ambiguous_input = "the dog saw a dog with a telescope in the park with a telescope"
    .split(' ')
    .collect::<Vec<_>>();

  c.bench_function("parse simple", |b| {
    b.iter(|| parse(black_box(&grammar), black_box(&simple_input)))
  });

  c.bench_function("parse pp-attachment ambiguity", |b| {
    b.iter(|| parse(black_box(&grammar), black_box(&ambiguous_input)))
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
