//! Random sources
//!
//! Two sources that are never interchangeable:
//!
//! - [`SeededRng`] decides outcomes. It is a pure function of the seed string.
//! - [`CosmeticRng`] drives timing jitter, stop order, autoplay delays and
//!   fresh seed strings. It is OS-seeded and never touches outcomes.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

const SEED_BASIS: u32 = 1_779_033_703;
const SEED_MIX: u32 = 3_432_918_353;
const ROUND_MUL_1: u32 = 2_246_822_507;
const ROUND_MUL_2: u32 = 3_266_489_909;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Upper bound (exclusive) of generated numeric seeds
const SEED_SPACE: u32 = 1_000_000_000;

/// Seeded gameplay generator with 32-bit state.
///
/// The seed string is hashed over its UTF-16 code units and UTF-16 length,
/// not its UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Hash a seed string into generator state
    pub fn from_seed(seed: &str) -> Self {
        let units: Vec<u16> = seed.encode_utf16().collect();
        let mut h = SEED_BASIS ^ units.len() as u32;
        for &unit in &units {
            h = (h ^ unit as u32).wrapping_mul(SEED_MIX);
            h = h.rotate_left(13);
        }
        Self { state: h }
    }

    /// Resume from a raw state word
    pub fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// Current state word
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance and return the new 32-bit state
    pub fn next_u32(&mut self) -> u32 {
        let mut h = self.state;
        h = (h ^ (h >> 16)).wrapping_mul(ROUND_MUL_1);
        h = (h ^ (h >> 13)).wrapping_mul(ROUND_MUL_2);
        h ^= h >> 16;
        self.state = h;
        h
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / TWO_POW_32
    }
}

/// Unseeded source for presentation-only variance
#[derive(Debug, Clone)]
pub struct CosmeticRng {
    inner: StdRng,
}

impl CosmeticRng {
    pub fn new() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Uniform value in `[min, max)`; returns `min` for an empty range
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max > min {
            self.inner.random_range(min..max)
        } else {
            min
        }
    }

    /// Shuffle in place (Fisher–Yates)
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Fresh decimal seed string in `[0, 10^9)`
    pub fn seed_string(&mut self) -> String {
        self.inner.random_range(0..SEED_SPACE).to_string()
    }
}

impl Default for CosmeticRng {
    fn default() -> Self {
        Self::new()
    }
}
