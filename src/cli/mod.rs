//! Command-line interface for roundmix.
//!
//! This module provides the commands for building a round, previewing its
//! plan and checking the external tools.

mod commands;

pub use commands::{Cli, Commands, run_command};
