//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Aegis - privacy gate for email threat analysis.
#[derive(Debug, Parser)]
#[command(name = "aegis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.aegis/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Classification endpoint
    #[arg(long, global = true, env = "AEGIS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Show safe verdicts too
    #[arg(long, global = true)]
    pub always_show: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the redacted form of a message
    Redact(RedactArgs),

    /// Redact a message and classify it
    Analyze(AnalyzeArgs),

    /// Run the gate over messages read from stdin
    Watch(WatchArgs),

    /// Print the effective configuration
    Config,
}

/// Arguments for the redact command.
#[derive(Debug, Parser)]
pub struct RedactArgs {
    /// Input file (stdin when omitted)
    pub file: Option<PathBuf>,

    /// Print per-rule replacement counts
    #[arg(short, long)]
    pub report: bool,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Input file (stdin when omitted)
    pub file: Option<PathBuf>,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Override the debounce window (milliseconds)
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Override the minimum message length
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Delay between piped messages (milliseconds, default twice the debounce window)
    #[arg(long)]
    pub pace_ms: Option<u64>,
}
