//! Record file naming inside a storage directory

use std::path::{Path, PathBuf};

/// Prefix shared by every record file
pub const RECORD_PREFIX: &str = "throttlepipe-";

const MAX_READABLE_LEN: usize = 64;

/// File name of the record for `key`
///
/// The readable part keeps `[A-Za-z0-9._-]` and replaces anything else with
/// `_`. The blake3 suffix keeps keys that sanitize alike apart.
pub fn record_file_name(key: &str) -> String {
    let readable: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_READABLE_LEN)
        .collect();

    let digest = blake3::hash(key.as_bytes()).to_hex();
    format!("{}{}-{}.json", RECORD_PREFIX, readable, &digest.as_str()[..16])
}

/// Full path of the record for `key` in `dir`
pub fn record_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(record_file_name(key))
}

/// Path of the lock file guarding the record at `record`
pub fn lock_path(record: &Path) -> PathBuf {
    let mut name = record.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}
