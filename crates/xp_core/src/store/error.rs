use thiserror::Error;

/// Failures of a progression store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode store snapshot: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Failed to decode store snapshot: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Store payload does not decompress")]
    Decompression,

    /// File content does not match its SHA-256 trailer
    #[error("Store checksum mismatch")]
    ChecksumMismatch,

    #[error("Store file too short to be valid")]
    Corrupted,

    /// Written by a different store format
    #[error("Store format version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    /// Backend temporarily unreachable (timeout, connection refused, ...)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Transient failures where the same operation may succeed later.
    /// Damaged or foreign data never heals by retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Io(_) | StoreError::Unavailable(_))
    }
}
