//! lr-state: Persisted account state for Lucky Reels
//!
//! The slot engine only needs two persisted values, the credit balance and
//! the current seed. Any substrate with string get/set semantics can carry
//! them:
//!
//! - `MemoryStore` - process-local, used for tests and batch simulation
//! - `JsonFileStore` - a flat JSON object on disk
//! - `AccountStore` - load/save contract on top of either, degrading to
//!   in-memory values when the substrate fails

mod account;
mod store;

pub use account::*;
pub use store::*;
