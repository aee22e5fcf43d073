//! Command-line interface for tunegrab.
//!
//! This module provides the download, inspect, cover and config commands.

mod commands;

pub use commands::{Cli, Commands, run_command};
