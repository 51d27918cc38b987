use thiserror::Error;

use crate::state::UserId;
use crate::store::StoreError;

/// Errors surfaced by the level curve and the progression engine.
#[derive(Error, Debug)]
pub enum ProgressionError {
    #[error("Invalid level: {level} (expected 1..={max_level})")]
    InvalidLevel { level: u32, max_level: u32 },

    #[error("Unknown XP action: {action}")]
    UnknownAction { action: String },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("Invalid XP amount: {amount} (must be positive)")]
    InvalidAmount { amount: i64 },

    /// Award would push cumulative XP past what a store record can hold
    #[error("XP overflow for {user_id}: {cumulative_xp} + {amount} exceeds the storable maximum")]
    XpOverflow { user_id: UserId, cumulative_xp: u64, amount: u64 },

    #[error("Malformed progression record for {user_id}: {reason}")]
    MalformedRecord { user_id: UserId, reason: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl ProgressionError {
    /// Whether retrying the same call could succeed.
    ///
    /// Only transport-level store failures qualify; everything else is a
    /// caller or data problem.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProgressionError::Persistence(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProgressionError>;
