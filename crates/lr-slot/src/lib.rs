//! # lr-slot - Deterministic Slot Engine for Lucky Reels
//!
//! Reproducible outcome core for a 5×3 weighted-reel slot machine. Rendering,
//! easing and audio live in the presentation layer; this crate only decides
//! what lands and what it pays.
//!
//! ## Features
//!
//! - **Seeded PRNG**: string-seeded 32-bit generator, identical sequence per seed
//! - **Weighted Sampling**: fixed-order cumulative draw over the symbol catalog
//! - **Index-Based Grid**: visible window derived from strip + top index only
//! - **Run Scoring**: longest run of equal symbols anywhere on a payline
//! - **Spin Sessions**: Idle → Spinning → Settled with an all-reels barrier
//!
//! ## Architecture
//!
//! ```text
//! SlotSession
//!     │
//!     ├── SeededRng ──> WeightedSampler ──> SpinPlan (strips + stop advances)
//!     ├── Vec<Reel> (strip, top_index) ──> visible_grid()
//!     ├── PayTable (catalog, paylines) ──> Evaluation
//!     ├── CosmeticRng ──> ReelTiming / autoplay delay (never seeded)
//!     └── AccountStore (credits, seed)
//!           │
//!           v
//!     SpinResult { total_win, hits, credits_after }
//! ```

pub mod config;
pub mod error;
pub mod paytable;
pub mod reel;
pub mod rng;
pub mod session;
pub mod symbols;
pub mod timing;

pub use config::*;
pub use error::*;
pub use paytable::*;
pub use reel::*;
pub use rng::*;
pub use session::*;
pub use symbols::*;
pub use timing::*;
