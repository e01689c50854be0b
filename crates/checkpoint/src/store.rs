//! The checkpoint store contract

use crate::{Checkpoint, Result};
use chrono::{DateTime, Utc};

/// Result of loading a key's record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loaded {
    /// The stored checkpoint (`never` if the record was just created)
    pub checkpoint: Checkpoint,
    /// Whether the record existed before this load
    pub existed: bool,
}

/// Durable read/write of one checkpoint record per key
///
/// Implementations must guarantee:
/// - `load` on an unknown key creates a `never` record and reports
///   `existed = false`; later loads see `existed = true`
/// - a record that cannot be decoded is reported as `StoreError::Corrupt`
///   and left as it is
/// - `store` is atomic with respect to `load`: a reader sees either the old
///   or the new record in full
/// - operations on different keys never affect each other
pub trait CheckpointStore {
    /// Read the record for `key`, creating it on first use
    fn load(&self, key: &str) -> Result<Loaded>;

    /// Overwrite the record for `key`
    fn store(&self, key: &str, at: DateTime<Utc>) -> Result<()>;

    /// Read the record for `key` without creating it
    fn inspect(&self, key: &str) -> Result<Option<Checkpoint>>;

    /// Delete the record for `key`
    ///
    /// Returns `false` if there was no record.
    fn clear(&self, key: &str) -> Result<bool>;

    /// Human-readable location of the record for `key`
    fn describe(&self, key: &str) -> String;
}

impl<S: CheckpointStore + ?Sized> CheckpointStore for &S {
    fn load(&self, key: &str) -> Result<Loaded> {
        (**self).load(key)
    }

    fn store(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        (**self).store(key, at)
    }

    fn inspect(&self, key: &str) -> Result<Option<Checkpoint>> {
        (**self).inspect(key)
    }

    fn clear(&self, key: &str) -> Result<bool> {
        (**self).clear(key)
    }

    fn describe(&self, key: &str) -> String {
        (**self).describe(key)
    }
}
