//! Progression Stores
//!
//! The persistence collaborator behind the engine. A store owns every
//! user's `StoredProgression`; the engine only reads a record, computes,
//! and writes both fields back in one call.

pub mod error;
pub mod file;
pub mod history;
pub mod memory;

use std::sync::Arc;

pub use error::StoreError;
pub use file::FileStore;
pub use history::{HistoryAction, XpHistoryEntry};
pub use memory::MemoryStore;

use crate::state::{StoredProgression, UserId};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait ProgressionStore: Send + Sync {
    /// `Ok(None)` when the user has no progression record
    fn read_progression(&self, user_id: &UserId) -> StoreResult<Option<StoredProgression>>;

    /// Replace both fields of the record at once.
    ///
    /// On error nothing may be committed.
    fn write_progression(&self, user_id: &UserId, record: StoredProgression) -> StoreResult<()>;

    fn append_history(&self, _entry: &XpHistoryEntry) -> StoreResult<()> {
        Ok(())
    }

    /// Most recent entries first
    fn recent_history(&self, _user_id: &UserId, _limit: usize) -> StoreResult<Vec<XpHistoryEntry>> {
        Ok(Vec::new())
    }
}

impl<S: ProgressionStore + ?Sized> ProgressionStore for Arc<S> {
    fn read_progression(&self, user_id: &UserId) -> StoreResult<Option<StoredProgression>> {
        (**self).read_progression(user_id)
    }

    fn write_progression(&self, user_id: &UserId, record: StoredProgression) -> StoreResult<()> {
        (**self).write_progression(user_id, record)
    }

    fn append_history(&self, entry: &XpHistoryEntry) -> StoreResult<()> {
        (**self).append_history(entry)
    }

    fn recent_history(&self, user_id: &UserId, limit: usize) -> StoreResult<Vec<XpHistoryEntry>> {
        (**self).recent_history(user_id, limit)
    }
}

/// Newest-first slice of one user's entries from a chronological log
pub(crate) fn newest_for_user(
    log: &[XpHistoryEntry],
    user_id: &UserId,
    limit: usize,
) -> Vec<XpHistoryEntry> {
    log.iter().rev().filter(|e| &e.user_id == user_id).take(limit).cloned().collect()
}
