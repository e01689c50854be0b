//! In-memory checkpoint store

use crate::store::{CheckpointStore, Loaded};
use crate::{Checkpoint, Result, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
enum Slot {
    Record(Checkpoint),
    /// Raw bytes that failed to decode
    Corrupt(Vec<u8>),
}

/// Process-local store keyed by string
///
/// Every operation holds the map lock, so `store` is trivially atomic.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    records: Mutex<HashMap<String, Slot>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put undecodable bytes under `key`
    pub fn insert_corrupt(&self, key: &str, raw: impl Into<Vec<u8>>) {
        self.records
            .lock()
            .insert(key.to_string(), Slot::Corrupt(raw.into()));
    }

    /// Raw bytes of a corrupt slot, if `key` holds one
    pub fn corrupt_bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.records.lock().get(key) {
            Some(Slot::Corrupt(raw)) => Some(raw.clone()),
            _ => None,
        }
    }

    /// Number of keys with a record
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn corrupt_error(key: &str, raw: &[u8]) -> StoreError {
        let reason = match Checkpoint::decode(raw) {
            Err(reason) => reason,
            Ok(_) => "record marked corrupt".to_string(),
        };
        StoreError::Corrupt {
            path: PathBuf::from(format!("memory:{}", key)),
            reason,
        }
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, key: &str) -> Result<Loaded> {
        let mut records = self.records.lock();
        match records.get(key) {
            Some(Slot::Record(checkpoint)) => Ok(Loaded {
                checkpoint: *checkpoint,
                existed: true,
            }),
            Some(Slot::Corrupt(raw)) => Err(Self::corrupt_error(key, raw)),
            None => {
                records.insert(key.to_string(), Slot::Record(Checkpoint::never()));
                Ok(Loaded {
                    checkpoint: Checkpoint::never(),
                    existed: false,
                })
            }
        }
    }

    fn store(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        self.records
            .lock()
            .insert(key.to_string(), Slot::Record(Checkpoint::at(at)));
        Ok(())
    }

    fn inspect(&self, key: &str) -> Result<Option<Checkpoint>> {
        match self.records.lock().get(key) {
            Some(Slot::Record(checkpoint)) => Ok(Some(*checkpoint)),
            Some(Slot::Corrupt(raw)) => Err(Self::corrupt_error(key, raw)),
            None => Ok(None),
        }
    }

    fn clear(&self, key: &str) -> Result<bool> {
        Ok(self.records.lock().remove(key).is_some())
    }

    fn describe(&self, key: &str) -> String {
        format!("memory:{}", key)
    }
}
