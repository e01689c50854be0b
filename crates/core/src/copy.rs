//! Stream copier

use crate::TransferError;
use std::io::{ErrorKind, Read, Write};

const BUFFER_SIZE: usize = 64 * 1024;

/// Copy `input` to `output` until clean end of data, then flush
///
/// Returns the number of bytes copied. Any read or write failure other than
/// an interrupted call is fatal; bytes already handed to `output` may or may
/// not have reached their destination in that case.
pub fn copy_stream<R, W>(input: &mut R, output: &mut W) -> Result<u64, TransferError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut copied = 0u64;

    loop {
        let bytes_read = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(TransferError::Read { copied, source }),
        };

        output
            .write_all(&buffer[..bytes_read])
            .map_err(|source| TransferError::Write { copied, source })?;
        copied += bytes_read as u64;
    }

    output
        .flush()
        .map_err(|source| TransferError::Write { copied, source })?;

    Ok(copied)
}
