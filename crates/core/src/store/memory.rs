//! In-memory record store for tests and embedded use.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{DataStore, StorageError, StoredRecord};
use crs_types::RecordId;

/// A [`DataStore`] backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<RecordId, StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for MemoryStore {
    fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, StorageError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(&id).cloned())
    }

    fn put(&self, record: &StoredRecord) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(record.id, record.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<StoredRecord>, StorageError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.values().cloned().collect())
    }
}
