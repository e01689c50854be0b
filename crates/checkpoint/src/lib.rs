//! Checkpoint records and their persistence
//!
//! This crate provides:
//! - The checkpoint record (last successful pass for a key)
//! - A self-describing JSON encoding for records
//! - The `CheckpointStore` trait with file-backed and in-memory stores
//! - Record file naming inside a storage directory
//! - An exclusive per-record lock for callers that need one

pub mod checkpoint;
pub mod error;
pub mod file;
pub mod layout;
pub mod lock;
pub mod memory;
pub mod store;

// Re-exports
pub use checkpoint::Checkpoint;
pub use error::StoreError;
pub use file::FileCheckpointStore;
pub use lock::RecordLock;
pub use memory::MemoryCheckpointStore;
pub use store::{CheckpointStore, Loaded};

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
