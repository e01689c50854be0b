//! Store error types

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a checkpoint store operation
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing resource could not be created, opened, read or written
    #[error("failed to {op} checkpoint record {}: {source}", path.display())]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A record exists but does not decode into a checkpoint
    #[error("corrupt checkpoint record {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, op: &'static str, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            op,
            source,
        }
    }

    /// Whether this is a decode failure rather than an I/O failure
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// Location of the record the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Corrupt { path, .. } => path,
        }
    }
}
