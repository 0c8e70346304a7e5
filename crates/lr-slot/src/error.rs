//! Error types for the slot engine

use thiserror::Error;

/// Spin controller error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Insufficient credits: bet {bet}, balance {credits}")]
    InsufficientFunds { bet: u64, credits: u64 },

    #[error("A spin is already in progress")]
    SpinInProgress,

    #[error("No spin in progress")]
    NotSpinning,

    #[error("Unknown reel {reel} (machine has {reels})")]
    UnknownReel { reel: usize, reels: usize },

    #[error("Reel {0} already settled")]
    ReelAlreadySettled(usize),

    #[error("Invalid settle offset: {0}")]
    InvalidOffset(f64),

    #[error("Spin {0} ended with unsettled reels")]
    SpinIncomplete(String),
}

impl SlotError {
    /// Rejections of a spin request that leave the session untouched
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. } | Self::SpinInProgress)
    }
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
