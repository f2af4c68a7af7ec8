//! Aegis CLI library.
//!
//! Command definitions, configuration loading, command execution and output
//! formatting for the `aegis` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command, OutputFormat};
pub use error::{CliError, Result};
pub use output::Formatter;
