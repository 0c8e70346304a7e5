//! Symbol catalog and weighted sampling

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rng::SeededRng;

/// Symbol identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ids of the reference catalog
pub mod ids {
    use super::SymbolId;

    pub const KIR: SymbolId = SymbolId(1);
    pub const ZIT: SymbolId = SymbolId(2);
    pub const HUF: SymbolId = SymbolId(3);
    pub const KLEE: SymbolId = SymbolId(4);
    pub const SIEBEN: SymbolId = SymbolId(5);
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique id
    pub id: SymbolId,
    /// Short key (e.g., "KIR", "SIEBEN")
    pub key: String,
    /// Human-readable label
    pub label: String,
    /// Glyph used by text front-ends
    #[serde(default)]
    pub glyph: String,
    /// Relative draw weight (> 0)
    pub weight: u32,
    /// Base payout multiplier (paid in full for a run of 5)
    pub payout: u32,
}

impl Symbol {
    pub fn new(
        id: u32,
        key: impl Into<String>,
        label: impl Into<String>,
        glyph: impl Into<String>,
        weight: u32,
        payout: u32,
    ) -> Self {
        Self {
            id: SymbolId(id),
            key: key.into(),
            label: label.into(),
            glyph: glyph.into(),
            weight,
            payout,
        }
    }
}

/// Ordered symbol catalog. Declaration order is draw order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
}

impl SymbolCatalog {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Reference catalog: rarer symbols pay more
    pub fn reference() -> Self {
        Self::new(vec![
            Symbol::new(ids::KIR.0, "KIR", "Cherry", "🍒", 30, 5),
            Symbol::new(ids::ZIT.0, "ZIT", "Lemon", "🍋", 24, 10),
            Symbol::new(ids::HUF.0, "HUF", "Horseshoe", "🧲", 16, 25),
            Symbol::new(ids::KLEE.0, "KLEE", "Clover", "☘️", 10, 50),
            Symbol::new(ids::SIEBEN.0, "SIEBEN", "Seven", "7️⃣", 4, 100),
        ])
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    pub fn by_key(&self, key: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.key == key)
    }

    /// Base payout for a symbol; unknown ids pay nothing
    pub fn payout(&self, id: SymbolId) -> u32 {
        self.get(id).map(|s| s.payout).unwrap_or(0)
    }

    /// Display key for a symbol, falling back to the raw id
    pub fn key_of(&self, id: SymbolId) -> String {
        self.get(id)
            .map(|s| s.key.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn total_weight(&self) -> u64 {
        self.symbols.iter().map(|s| s.weight as u64).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

/// Cumulative-subtraction sampler over a catalog snapshot
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    entries: Vec<(SymbolId, f64)>,
    total: f64,
}

impl WeightedSampler {
    /// Returns `None` for an empty catalog or a zero total weight
    pub fn new(catalog: &SymbolCatalog) -> Option<Self> {
        let entries: Vec<(SymbolId, f64)> = catalog
            .iter()
            .map(|s| (s.id, s.weight as f64))
            .collect();
        let total = catalog.total_weight() as f64;

        if entries.is_empty() || total <= 0.0 {
            return None;
        }
        Some(Self { entries, total })
    }

    /// Draw one symbol.
    ///
    /// Walks the catalog in declaration order subtracting weights from
    /// `next() * total`; the first entry that brings the remainder to `<= 0`
    /// wins. The last entry is returned if rounding leaves a positive remainder.
    pub fn draw(&self, rng: &mut SeededRng) -> SymbolId {
        let mut v = rng.next_f64() * self.total;
        for &(id, weight) in &self.entries {
            v -= weight;
            if v <= 0.0 {
                return id;
            }
        }
        self.entries[self.entries.len() - 1].0
    }

    /// Draw probability of a symbol
    pub fn probability(&self, id: SymbolId) -> f64 {
        self.entries
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, w)| w / self.total)
            .unwrap_or(0.0)
    }
}
