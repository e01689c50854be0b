//! Gate error taxonomy

use checkpoint::StoreError;
use thiserror::Error;

/// Failure while copying input to output
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to read input after {copied} bytes: {source}")]
    Read {
        copied: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output after {copied} bytes: {source}")]
    Write {
        copied: u64,
        #[source]
        source: std::io::Error,
    },
}

impl TransferError {
    /// Bytes fully written to the output before the failure
    pub fn copied(&self) -> u64 {
        match self {
            Self::Read { copied, .. } | Self::Write { copied, .. } => *copied,
        }
    }
}

/// Fatal outcome of a gate invocation
///
/// Each variant is a distinct cause so callers can tell a broken store from
/// a corrupt record from a failed stream.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("checkpoint store I/O failed")]
    StoreIo(#[source] StoreError),

    #[error("checkpoint record is corrupt")]
    CorruptRecord(#[source] StoreError),

    #[error("stream transfer failed, checkpoint not updated")]
    Transfer(#[from] TransferError),
}

/// Coarse classification of a `GateError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StoreIo,
    CorruptRecord,
    Transfer,
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StoreIo(_) => ErrorKind::StoreIo,
            Self::CorruptRecord(_) => ErrorKind::CorruptRecord,
            Self::Transfer(_) => ErrorKind::Transfer,
        }
    }
}

impl From<StoreError> for GateError {
    fn from(err: StoreError) -> Self {
        if err.is_corrupt() {
            Self::CorruptRecord(err)
        } else {
            Self::StoreIo(err)
        }
    }
}
