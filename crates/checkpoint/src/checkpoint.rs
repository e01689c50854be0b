//! Checkpoint record and its on-disk encoding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current record format version
pub const RECORD_VERSION: u32 = 1;

/// The last successful pass for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checkpoint {
    /// Instant of the last pass (`None` = never passed)
    pub last_pass: Option<DateTime<Utc>>,
}

/// Serialized form of a checkpoint record
#[derive(Serialize, Deserialize)]
struct RecordContent {
    version: u32,
    key: String,
    last_pass: Option<DateTime<Utc>>,
}

impl Checkpoint {
    /// A record that has never seen a pass
    pub const fn never() -> Self {
        Self { last_pass: None }
    }

    /// A record whose last pass happened at `at`
    pub const fn at(at: DateTime<Utc>) -> Self {
        Self { last_pass: Some(at) }
    }

    /// Whether this key has ever passed
    pub fn is_never(&self) -> bool {
        self.last_pass.is_none()
    }

    /// Encode the record for `key` as a JSON document
    pub fn encode(&self, key: &str) -> serde_json::Result<Vec<u8>> {
        let content = RecordContent {
            version: RECORD_VERSION,
            key: key.to_string(),
            last_pass: self.last_pass,
        };

        let mut bytes = serde_json::to_vec(&content)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Decode a record, returning a human-readable reason on failure
    pub fn decode(bytes: &[u8]) -> std::result::Result<Self, String> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err("record is empty".to_string());
        }

        let content: RecordContent =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid record: {}", e))?;

        if content.version != RECORD_VERSION {
            return Err(format!(
                "unsupported record version {} (expected {})",
                content.version, RECORD_VERSION
            ));
        }

        Ok(Self {
            last_pass: content.last_pass,
        })
    }
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.last_pass {
            Some(at) => write!(f, "{}", at.to_rfc3339()),
            None => write!(f, "never"),
        }
    }
}
