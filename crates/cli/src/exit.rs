//! Process exit codes

use tp_core::{ErrorKind, GateError};

/// Any failure that is not a gate error (config, logging setup)
pub const FAILURE: u8 = 1;
/// The checkpoint store could not be read or written
pub const STORE_IO: u8 = 3;
/// The checkpoint record exists but is unreadable
pub const CORRUPT_RECORD: u8 = 4;
/// Copying input to output failed
pub const TRANSFER: u8 = 5;

/// Exit code for a failed invocation
pub fn code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<GateError>().map(GateError::kind) {
        Some(ErrorKind::StoreIo) => STORE_IO,
        Some(ErrorKind::CorruptRecord) => CORRUPT_RECORD,
        Some(ErrorKind::Transfer) => TRANSFER,
        None => FAILURE,
    }
}
