use std::env;
use std::fs;
use std::io;
use std::io::{BufRead, Write};
use std::process;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pcfgparse::generate::DEFAULT_START;
use pcfgparse::utils::tokenize;
use pcfgparse::{read_treebank, render_parse, Err, GrammarInducer, GrammarTable};

const DEFAULT_COUNT: usize = 100;
/// Attempts allowed per requested sentence before `generate` gives up
const ATTEMPTS_PER_SENTENCE: usize = 1000;

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {0} induce TREEBANK
       {0} parse GRAMMAR [options]
       {0} generate GRAMMAR [options]

induce    Print the grammar induced from a bracketed treebank
parse     Parse sentences from stdin, one per line, printing one tree per line
generate  Print distinct random sentences

Options:
  -h, --help         Print this message
  -c, --chart        (parse) Print the parse chart of each sentence to stderr
  -n, --count N      (generate) Number of sentences (defaults to {1})
  -s, --seed SEED    (generate) Seed the random number generator
      --start SYM    (generate) Start symbol (defaults to {2})

Logging is controlled with RUST_LOG (defaults to info).",
    prog_name, DEFAULT_COUNT, DEFAULT_START
  )
}

#[derive(Debug, PartialEq)]
enum Command {
  Induce,
  Parse,
  Generate,
}

struct Args {
  command: Command,
  filename: String,
  print_chart: bool,
  count: usize,
  seed: Option<u64>,
  start: String,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    if v.is_empty() {
      return Err(Self::make_error_message("bad argument vector", "pcfgparse"));
    }

    let mut iter = v.into_iter();
    let prog_name = iter.next().unwrap_or_default();

    let mut command: Option<Command> = None;
    let mut filename: Option<String> = None;
    let mut print_chart = false;
    let mut count = DEFAULT_COUNT;
    let mut seed: Option<u64> = None;
    let mut start = DEFAULT_START.to_string();

    while let Some(o) = iter.next() {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-c" || o == "--chart" {
        print_chart = true;
      } else if o == "-n" || o == "--count" {
        count = iter
          .next()
          .and_then(|n| n.parse().ok())
          .ok_or_else(|| Self::make_error_message("--count needs a number", &prog_name))?;
      } else if o == "-s" || o == "--seed" {
        seed = Some(
          iter
            .next()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| Self::make_error_message("--seed needs a number", &prog_name))?,
        );
      } else if o == "--start" {
        start = iter
          .next()
          .ok_or_else(|| Self::make_error_message("--start needs a symbol", &prog_name))?;
      } else if command.is_none() {
        command = Some(match o.as_str() {
          "induce" => Command::Induce,
          "parse" => Command::Parse,
          "generate" => Command::Generate,
          _ => return Err(Self::make_error_message("unknown command", &prog_name)),
        });
      } else if filename.is_none() {
        filename = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", &prog_name));
      }
    }

    match (command, filename) {
      (Some(command), Some(filename)) => Ok(Self {
        command,
        filename,
        print_chart,
        count,
        seed,
        start,
      }),
      (None, _) => Err(Self::make_error_message("missing command", &prog_name)),
      (Some(_), None) => Err(Self::make_error_message("missing filename", &prog_name)),
    }
  }
}

fn induce(opts: &Args) -> Result<(), Err> {
  let trees = read_treebank(&fs::read_to_string(&opts.filename)?)?;

  let mut inducer = GrammarInducer::new();
  inducer.add_source(trees.as_slice());
  info!(trees = trees.len(), rules = inducer.observed(), "read treebank");

  let g = inducer.build();
  let mut stdout = io::stdout().lock();
  write!(stdout, "{}", g)?;
  Ok(())
}

fn parse(opts: &Args) -> Result<(), Err> {
  let g = GrammarTable::read_from_file(&opts.filename)?;
  let parser = g.parser();

  let mut parsed = 0;
  let mut skipped = 0;
  let mut stdout = io::stdout().lock();

  for line in io::stdin().lock().lines() {
    let line = line?;
    let tokens = tokenize(&line);

    if opts.print_chart {
      eprintln!("chart:\n{}", parser.parse_chart(&tokens));
    }

    let result = parser.parse(&tokens);
    if result.is_some() {
      parsed += 1;
    } else {
      skipped += 1;
    }
    writeln!(stdout, "{}", render_parse(&tokens, result.as_ref()))?;
  }

  info!(parsed, skipped, total = parsed + skipped, "finished parsing");
  Ok(())
}

fn generate(opts: &Args) -> Result<(), Err> {
  let g = GrammarTable::read_from_file(&opts.filename)?;
  let mut rng = match opts.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_os_rng(),
  };

  let language = g.generator().generate_language(
    &mut rng,
    &opts.start,
    opts.count,
    opts.count.saturating_mul(ATTEMPTS_PER_SENTENCE),
  );

  let mut stdout = io::stdout().lock();
  for sentence in language {
    writeln!(stdout, "{}", sentence)?;
  }
  Ok(())
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  match opts.command {
    Command::Induce => induce(&opts),
    Command::Parse => parse(&opts),
    Command::Generate => generate(&opts),
  }
}
