//! throttlepipe command-line front end
//!
//! Glue around `tp_core`: settings resolution, logging setup, the `gate`
//! and `status` commands, and exit codes.

pub mod cmd;
pub mod config;
pub mod exit;
pub mod logging;
pub mod util;
