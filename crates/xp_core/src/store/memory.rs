use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::history::XpHistoryEntry;
use super::{newest_for_user, ProgressionStore, StoreResult};
use crate::state::{StoredProgression, UserId};

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<UserId, StoredProgression>>,
    history: RwLock<Vec<XpHistoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a level 1 record; false if the user already has one
    pub fn create_profile(&self, user_id: &UserId) -> bool {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(user_id) {
            return false;
        }
        records.insert(user_id.clone(), StoredProgression::initial());
        true
    }

    /// Seed a record without any validation
    pub fn insert_raw(&self, user_id: &UserId, record: StoredProgression) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.clone(), record);
    }

    pub fn get(&self, user_id: &UserId) -> Option<StoredProgression> {
        self.records.read().unwrap_or_else(PoisonError::into_inner).get(user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressionStore for MemoryStore {
    fn read_progression(&self, user_id: &UserId) -> StoreResult<Option<StoredProgression>> {
        Ok(self.get(user_id))
    }

    fn write_progression(&self, user_id: &UserId, record: StoredProgression) -> StoreResult<()> {
        self.insert_raw(user_id, record);
        Ok(())
    }

    fn append_history(&self, entry: &XpHistoryEntry) -> StoreResult<()> {
        self.history.write().unwrap_or_else(PoisonError::into_inner).push(entry.clone());
        Ok(())
    }

    fn recent_history(&self, user_id: &UserId, limit: usize) -> StoreResult<Vec<XpHistoryEntry>> {
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        Ok(newest_for_user(&history, user_id, limit))
    }
}
