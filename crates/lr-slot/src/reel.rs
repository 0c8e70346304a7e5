//! Reel strips and the visible grid
//!
//! The visible grid is derived from integer state only:
//! `grid[reel][row] = strip[(top_index + row) % strip_len]`. Nothing here
//! looks at rendered geometry. The presentation layer reports a settled pixel
//! offset once, and [`advance_top_index`] snaps it to a strip index.

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::rng::SeededRng;
use crate::symbols::{SymbolId, WeightedSampler};

/// Visible symbols, indexed `[reel][row]`
pub type Grid = Vec<Vec<SymbolId>>;

/// One reel: a cyclic strip and the index showing in the top row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reel {
    strip: Vec<SymbolId>,
    top_index: usize,
}

impl Reel {
    /// New reel resting at index 0
    pub fn new(strip: Vec<SymbolId>) -> Self {
        Self {
            strip,
            top_index: 0,
        }
    }

    /// New reel resting at `top_index` (wrapped)
    pub fn with_top_index(strip: Vec<SymbolId>, top_index: usize) -> Self {
        let mut reel = Self::new(strip);
        reel.set_top_index(top_index);
        reel
    }

    pub fn strip(&self) -> &[SymbolId] {
        &self.strip
    }

    pub fn len(&self) -> usize {
        self.strip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strip.is_empty()
    }

    pub fn top_index(&self) -> usize {
        self.top_index
    }

    pub fn set_top_index(&mut self, top_index: usize) {
        self.top_index = if self.strip.is_empty() {
            0
        } else {
            top_index % self.strip.len()
        };
    }

    /// Swap in fresh strip content; the resting position carries over
    pub fn replace_strip(&mut self, strip: Vec<SymbolId>) {
        self.strip = strip;
        let top = self.top_index;
        self.set_top_index(top);
    }

    /// Symbol at a strip position (wraps)
    pub fn symbol_at(&self, position: usize) -> Option<SymbolId> {
        if self.strip.is_empty() {
            return None;
        }
        Some(self.strip[position % self.strip.len()])
    }

    /// The `rows` symbols visible from the top row down
    pub fn window(&self, rows: usize) -> Vec<SymbolId> {
        (0..rows)
            .filter_map(|row| self.symbol_at(self.top_index + row))
            .collect()
    }
}

/// Draw a strip of `len` symbols
pub fn fill_strip(sampler: &WeightedSampler, rng: &mut SeededRng, len: usize) -> Vec<SymbolId> {
    (0..len).map(|_| sampler.draw(rng)).collect()
}

/// Visible grid across all reels
pub fn visible_grid(reels: &[Reel], rows: usize) -> Grid {
    reels.iter().map(|reel| reel.window(rows)).collect()
}

/// Snap a settled pixel offset to a strip index.
///
/// Rounds to the nearest whole symbol; exactly half a symbol rounds up to the
/// next one. Negative offsets wrap backwards around the strip.
pub fn advance_top_index(offset_px: f64, symbol_height: f64, strip_len: usize) -> SlotResult<usize> {
    if !offset_px.is_finite() {
        return Err(SlotError::InvalidOffset(offset_px));
    }
    if !(symbol_height.is_finite() && symbol_height > 0.0) || strip_len == 0 {
        return Err(SlotError::InvalidOffset(offset_px));
    }

    let steps = (offset_px / symbol_height + 0.5).floor();
    let len = strip_len as f64;
    Ok(steps.rem_euclid(len) as usize)
}

/// Pixel offset at which a reel rests on `top_index`
pub fn offset_for_index(top_index: usize, symbol_height: f64) -> f64 {
    top_index as f64 * symbol_height
}
