//! CLI command implementations

pub mod gate;
pub mod status;
