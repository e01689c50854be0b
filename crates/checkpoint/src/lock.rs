//! Exclusive per-record lock
//!
//! Held from before `load` until after `store` by callers that want at most
//! one pass per window across concurrent processes. Without it, racing
//! invocations on one key are last-writer-wins.

use crate::{layout, Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Exclusive lock on a checkpoint record, released on drop
///
/// The lock file itself is never removed: unlinking it while another
/// process waits on the old inode would let two holders in at once.
pub struct RecordLock {
    path: PathBuf,
    file: File,
}

/// Lock file content
#[derive(Debug, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub acquired_at: chrono::DateTime<chrono::Utc>,
}

impl RecordLock {
    /// Block until the lock for the record at `record` is held
    pub fn acquire(record: &Path) -> Result<Self> {
        let path = layout::lock_path(record);
        let file = open_lock_file(&path)?;

        flock_exclusive(&file, true).map_err(|e| StoreError::io(&path, "lock", e))?;

        let mut lock = Self { path, file };
        lock.write_holder()?;
        tracing::debug!(path = %lock.path.display(), "Acquired record lock");
        Ok(lock)
    }

    /// Take the lock only if nobody holds it
    pub fn try_acquire(record: &Path) -> Result<Option<Self>> {
        let path = layout::lock_path(record);
        let file = open_lock_file(&path)?;

        if !flock_exclusive(&file, false).map_err(|e| StoreError::io(&path, "lock", e))? {
            return Ok(None);
        }

        let mut lock = Self { path, file };
        lock.write_holder()?;
        Ok(Some(lock))
    }

    /// Read who holds (or last held) the lock for the record at `record`
    pub fn holder(record: &Path) -> Result<Option<LockHolder>> {
        let path = layout::lock_path(record);
        let mut contents = String::new();
        match File::open(&path) {
            Ok(mut file) => file
                .read_to_string(&mut contents)
                .map_err(|e| StoreError::io(&path, "read", e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, "open", e)),
        };

        // A holder that crashed mid-write leaves nothing useful behind
        Ok(serde_json::from_str(&contents).ok())
    }

    fn write_holder(&mut self) -> Result<()> {
        let holder = LockHolder {
            pid: std::process::id(),
            acquired_at: chrono::Utc::now(),
        };
        let serialized = serde_json::to_string(&holder)
            .map_err(|e| StoreError::io(&self.path, "encode", e.into()))?;

        write_lock_content(&mut self.file, &serialized)
            .map_err(|e| StoreError::io(&self.path, "write", e))
    }
}

impl std::fmt::Debug for RecordLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLock").field("path", &self.path).finish()
    }
}

fn write_lock_content(file: &mut File, content: &str) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| StoreError::io(path, "open", e))
}

/// Take an exclusive flock, returning `false` if `wait` is off and it is held
#[cfg(unix)]
fn flock_exclusive(file: &File, wait: bool) -> std::io::Result<bool> {
    use nix::errno::Errno;
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    let arg = if wait {
        FlockArg::LockExclusive
    } else {
        FlockArg::LockExclusiveNonblock
    };

    loop {
        match flock(file.as_raw_fd(), arg) {
            Ok(()) => return Ok(true),
            Err(Errno::EINTR) => continue,
            Err(Errno::EWOULDBLOCK) if !wait => return Ok(false),
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(not(unix))]
fn flock_exclusive(_file: &File, _wait: bool) -> std::io::Result<bool> {
    tracing::warn!("Record locking is not supported on this platform");
    Ok(true)
}
