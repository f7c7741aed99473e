use std::fmt;

use tracing::{debug, trace};

use crate::grammar::GrammarTable;

/// Address of a chart entry: the span it covers and its slot within that cell
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntryRef {
  pub start: usize,
  pub end: usize,
  pub slot: usize,
}

impl EntryRef {
  pub fn new(start: usize, end: usize, slot: usize) -> Self {
    Self { start, end, slot }
  }
}

impl fmt::Display for EntryRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}#{}", self.start, self.end, self.slot)
  }
}

/// How a chart entry was built
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackPointer {
  /// Produced directly from the token at its span
  Leaf,
  /// Produced by combining a left and a right entry
  Split(EntryRef, EntryRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry<'g> {
  pub symbol: &'g str,
  pub log_prob: f64,
  pub back: BackPointer,
}

/// CYK chart: one cell per span `[start, end)`, each cell an ordered list of
/// entries. Entries are never merged, so every derivation is kept until the
/// final selection.
#[derive(Debug)]
pub struct Chart<'g> {
  len: usize,
  cells: Vec<Vec<ChartEntry<'g>>>,
}

impl<'g> Chart<'g> {
  /// A chart for `len` tokens
  pub fn new(len: usize) -> Self {
    Self {
      len,
      cells: vec![Vec::new(); (len + 1) * (len + 1)],
    }
  }

  /// Number of tokens the chart covers
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  fn cell_idx(&self, start: usize, end: usize) -> usize {
    assert!(start <= end && end <= self.len, "span {}..{} out of range", start, end);
    start * (self.len + 1) + end
  }

  pub fn cell(&self, start: usize, end: usize) -> &[ChartEntry<'g>] {
    &self.cells[self.cell_idx(start, end)]
  }

  pub fn entry(&self, at: EntryRef) -> &ChartEntry<'g> {
    &self.cell(at.start, at.end)[at.slot]
  }

  /// Appends an entry to its cell and returns its address
  pub fn push(&mut self, start: usize, end: usize, entry: ChartEntry<'g>) -> EntryRef {
    let idx = self.cell_idx(start, end);
    let cell = &mut self.cells[idx];
    cell.push(entry);
    EntryRef::new(start, end, cell.len() - 1)
  }

  /// Total number of entries over all cells
  pub fn entry_count(&self) -> usize {
    self.cells.iter().map(Vec::len).sum()
  }

  /// The highest-probability entry in a cell. On ties the entry that was
  /// inserted first wins.
  pub fn best(&self, start: usize, end: usize) -> Option<EntryRef> {
    let mut best: Option<(usize, f64)> = None;
    for (slot, entry) in self.cell(start, end).iter().enumerate() {
      match best {
        Some((_, p)) if entry.log_prob <= p => {}
        _ => best = Some((slot, entry.log_prob)),
      }
    }
    best.map(|(slot, _)| EntryRef::new(start, end, slot))
  }
}

impl fmt::Display for Chart<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for width in 1..=self.len {
      for start in 0..=(self.len - width) {
        let end = start + width;
        let cell = self.cell(start, end);
        if cell.is_empty() {
          continue;
        }
        writeln!(f, "Span {}..{}:", start, end)?;
        for (slot, entry) in cell.iter().enumerate() {
          write!(f, "  #{} {} {:.4}", slot, entry.symbol, entry.log_prob)?;
          if let BackPointer::Split(left, right) = entry.back {
            write!(f, " <- {} {}", left, right)?;
          }
          writeln!(f)?;
        }
      }
    }
    Ok(())
  }
}

/// Fills a chart bottom-up: preterminals from the tokens, then every span by
/// increasing width, combining every entry pair across every split point.
pub fn parse_chart<'g, S: AsRef<str>>(g: &'g GrammarTable, input: &[S]) -> Chart<'g> {
  let n = input.len();
  let mut chart = Chart::new(n);

  for (idx, token) in input.iter().enumerate() {
    for (symbol, log_prob) in g.producers(token.as_ref(), 0.0) {
      chart.push(
        idx,
        idx + 1,
        ChartEntry {
          symbol,
          log_prob,
          back: BackPointer::Leaf,
        },
      );
    }
  }

  for width in 2..=n {
    for start in 0..=(n - width) {
      let end = start + width;
      for split in (start + 1)..end {
        // the cell being filled is never one of the two being read, but the
        // borrow checker can't see that, so read by index
        let left_len = chart.cell(start, split).len();
        let right_len = chart.cell(split, end).len();
        for l in 0..left_len {
          for r in 0..right_len {
            let left = EntryRef::new(start, split, l);
            let right = EntryRef::new(split, end, r);
            let (left_symbol, left_prob) = {
              let e = chart.entry(left);
              (e.symbol, e.log_prob)
            };
            let (right_symbol, right_prob) = {
              let e = chart.entry(right);
              (e.symbol, e.log_prob)
            };

            let key = format!("{} {}", left_symbol, right_symbol);
            for (symbol, log_prob) in g.producers(&key, left_prob + right_prob) {
              chart.push(
                start,
                end,
                ChartEntry {
                  symbol,
                  log_prob,
                  back: BackPointer::Split(left, right),
                },
              );
            }
          }
        }
      }
      trace!(start, end, entries = chart.cell(start, end).len(), "filled cell");
    }
  }

  debug!(tokens = n, entries = chart.entry_count(), "filled chart");

  chart
}
