//! File-backed checkpoint store

use crate::layout;
use crate::store::{CheckpointStore, Loaded};
use crate::{Checkpoint, Result, StoreError};
use chrono::{DateTime, Utc};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores one JSON record file per key in a directory
///
/// The directory is not created on demand: a missing directory is a store
/// I/O failure like any other.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Create a store over `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the record file for `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        layout::record_path(&self.dir, key)
    }

    fn read_record(&self, key: &str) -> Result<Option<Checkpoint>> {
        let path = self.record_path(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, "read", e)),
        };

        Checkpoint::decode(&bytes)
            .map(Some)
            .map_err(|reason| StoreError::Corrupt { path, reason })
    }

    fn create_record(&self, key: &str) -> Result<Loaded> {
        let path = self.record_path(key);
        let data = Checkpoint::never()
            .encode(key)
            .map_err(|e| StoreError::io(&path, "encode", e.into()))?;

        let created = atomic_write(&self.dir, &path, &data, WriteMode::CreateNew)
            .map_err(|e| StoreError::io(&path, "create", e))?;

        if created {
            tracing::warn!(key, path = %path.display(), "Checkpoint record did not exist, created it");
            return Ok(Loaded {
                checkpoint: Checkpoint::never(),
                existed: false,
            });
        }

        // Another invocation created the record between our read and write
        tracing::debug!(key, "Checkpoint record created concurrently, reading it back");
        match self.read_record(key)? {
            Some(checkpoint) => Ok(Loaded {
                checkpoint,
                existed: true,
            }),
            None => Err(StoreError::io(
                path,
                "read",
                std::io::Error::new(ErrorKind::NotFound, "record vanished after concurrent create"),
            )),
        }
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self, key: &str) -> Result<Loaded> {
        match self.read_record(key)? {
            Some(checkpoint) => Ok(Loaded {
                checkpoint,
                existed: true,
            }),
            None => self.create_record(key),
        }
    }

    fn store(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        let path = self.record_path(key);
        let data = Checkpoint::at(at)
            .encode(key)
            .map_err(|e| StoreError::io(&path, "encode", e.into()))?;

        atomic_write(&self.dir, &path, &data, WriteMode::Replace)
            .map_err(|e| StoreError::io(&path, "write", e))?;

        tracing::debug!(key, at = %at.to_rfc3339(), "Checkpoint record updated");
        Ok(())
    }

    fn inspect(&self, key: &str) -> Result<Option<Checkpoint>> {
        self.read_record(key)
    }

    fn clear(&self, key: &str) -> Result<bool> {
        let path = self.record_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, "remove", e)),
        }
    }

    fn describe(&self, key: &str) -> String {
        self.record_path(key).display().to_string()
    }
}

/// How `atomic_write` treats an existing target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace whatever is at the target
    Replace,
    /// Only write if the target does not exist yet
    CreateNew,
}

/// Atomic write helper
///
/// Writes data to a temporary file in `dir`, fsyncs it, then renames it to
/// the target path and fsyncs the directory. Readers see the old file or the
/// new one, never a partial write.
///
/// Returns `Ok(false)` when `mode` is `CreateNew` and the target already
/// exists; the temporary file is removed in that case.
pub fn atomic_write(dir: &Path, target: &Path, data: &[u8], mode: WriteMode) -> std::io::Result<bool> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    match mode {
        WriteMode::Replace => {
            tmp.persist(target).map_err(|e| e.error)?;
        }
        WriteMode::CreateNew => match tmp.persist_noclobber(target) {
            Ok(_) => {}
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.error),
        },
    }

    sync_dir(dir)?;
    Ok(true)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
