//! Workflow integration tests

pub mod failures;
pub mod pass_block;
