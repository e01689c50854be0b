//! Throttle gate core
//!
//! This crate provides:
//! - The throttle decision (has the window elapsed since the last pass?)
//! - The stream copier (input to output until clean end of data)
//! - The gate controller tying a checkpoint store, a clock and the copier
//!   together for one invocation

pub mod clock;
pub mod copy;
pub mod decision;
pub mod error;
pub mod gate;

// Re-exports
pub use clock::{Clock, FixedClock, SystemClock};
pub use copy::copy_stream;
pub use decision::{remaining, should_pass};
pub use error::{ErrorKind, GateError, TransferError};
pub use gate::{Gate, GateOptions, Outcome, Status};

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, GateError>;
