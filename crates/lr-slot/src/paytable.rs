//! Paylines and win calculation
//!
//! A line scores its longest run of identical symbols, wherever it sits on
//! the line. Runs do not have to start on the first reel. When two runs share
//! the maximal length the leftmost one is reported; payout only depends on
//! the run's symbol and length, so the choice only affects highlighting.

use serde::{Deserialize, Serialize};

use crate::reel::Grid;
use crate::symbols::{SymbolCatalog, SymbolId};

/// Shortest run that pays
pub const MIN_RUN: usize = 3;

/// A payline: one row index per reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Row position for each reel (e.g., `[0, 1, 2, 1, 0]` for a "V")
    pub rows: Vec<usize>,
}

impl Payline {
    pub fn new(rows: Vec<usize>) -> Self {
        Self { rows }
    }

    /// Same row across every reel
    pub fn straight(row: usize, reels: usize) -> Self {
        Self::new(vec![row; reels])
    }

    /// Symbols along this line, or `None` if the line leaves the grid
    pub fn extract(&self, grid: &Grid) -> Option<Vec<SymbolId>> {
        if self.rows.len() != grid.len() {
            return None;
        }
        self.rows
            .iter()
            .enumerate()
            .map(|(reel, &row)| grid[reel].get(row).copied())
            .collect()
    }
}

/// Reference 5×3 lines: top, middle, bottom, "V", "Λ"
pub fn reference_paylines() -> Vec<Payline> {
    vec![
        Payline::straight(0, 5),
        Payline::straight(1, 5),
        Payline::straight(2, 5),
        Payline::new(vec![0, 1, 2, 1, 0]),
        Payline::new(vec![2, 1, 0, 1, 2]),
    ]
}

/// A maximal block of identical symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub symbol: SymbolId,
    pub len: usize,
    pub start: usize,
}

/// Longest run in a sequence; the first one wins ties
pub fn longest_run(seq: &[SymbolId]) -> Option<Run> {
    let (&first, rest) = seq.split_first()?;

    let mut best = Run { symbol: first, len: 1, start: 0 };
    let mut current = best;

    for (offset, &symbol) in rest.iter().enumerate() {
        if symbol == current.symbol {
            current.len += 1;
        } else {
            current = Run { symbol, len: 1, start: offset + 1 };
        }
        if current.len > best.len {
            best = current;
        }
    }

    Some(best)
}

/// Bet multiplier for a run: 3 → 1, 4 → ⌊base·0.3⌋, 5+ → base
pub fn run_multiplier(run_len: usize, base_payout: u32) -> u64 {
    let base = base_payout as u64;
    match run_len {
        0..MIN_RUN => 0,
        3 => 1,
        // Integer form of floor(base * 0.3)
        4 => base * 3 / 10,
        _ => base,
    }
}

/// One paying line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineHit {
    /// Payline index
    pub line_index: usize,
    /// Matched symbol
    pub symbol: SymbolId,
    /// Run length (3..=reels)
    pub run_length: usize,
    /// First reel of the run
    pub start_column: usize,
    /// Bet multiplier
    pub multiplier: u64,
    /// `multiplier * bet`
    pub win: u64,
    /// Highlighted cells as (reel, row)
    pub cells: Vec<(usize, usize)>,
}

/// Result of evaluating a grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub total_win: u64,
    pub hits: Vec<LineHit>,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        self.total_win > 0
    }

    /// Hit with the largest multiplier (first on ties)
    pub fn top_hit(&self) -> Option<&LineHit> {
        self.hits
            .iter()
            .fold(None, |best: Option<&LineHit>, hit| match best {
                Some(b) if b.multiplier >= hit.multiplier => Some(b),
                _ => Some(hit),
            })
    }
}

/// Evaluate every payline against a grid
pub fn evaluate(grid: &Grid, paylines: &[Payline], catalog: &SymbolCatalog, bet: u64) -> Evaluation {
    let hits: Vec<LineHit> = paylines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| evaluate_line(grid, index, line, catalog, bet))
        .collect();

    let total_win = hits.iter().map(|h| h.win).fold(0u64, u64::saturating_add);

    Evaluation { total_win, hits }
}

fn evaluate_line(
    grid: &Grid,
    line_index: usize,
    line: &Payline,
    catalog: &SymbolCatalog,
    bet: u64,
) -> Option<LineHit> {
    let seq = line.extract(grid)?;
    let run = longest_run(&seq)?;
    if run.len < MIN_RUN {
        return None;
    }

    let multiplier = run_multiplier(run.len, catalog.payout(run.symbol));
    let cells = (run.start..run.start + run.len)
        .map(|reel| (reel, line.rows[reel]))
        .collect();

    Some(LineHit {
        line_index,
        symbol: run.symbol,
        run_length: run.len,
        start_column: run.start,
        multiplier,
        win: multiplier.saturating_mul(bet),
        cells,
    })
}

/// Catalog plus line set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayTable {
    pub catalog: SymbolCatalog,
    pub paylines: Vec<Payline>,
}

impl PayTable {
    pub fn new(catalog: SymbolCatalog, paylines: Vec<Payline>) -> Self {
        Self { catalog, paylines }
    }

    /// Reference catalog with the five reference lines
    pub fn reference() -> Self {
        Self::new(SymbolCatalog::reference(), reference_paylines())
    }

    pub fn evaluate(&self, grid: &Grid, bet: u64) -> Evaluation {
        evaluate(grid, &self.paylines, &self.catalog, bet)
    }
}

impl Default for PayTable {
    fn default() -> Self {
        Self::reference()
    }
}
