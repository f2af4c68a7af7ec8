//! Error types for the gate

use aegis_analysis::AnalysisError;
use thiserror::Error;

/// Errors that can occur while setting up or running the gate
///
/// Nothing that happens while processing a message is an error: failed
/// classifications are logged and counted, never propagated.
#[derive(Error, Debug)]
pub enum GateError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read a config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Analysis client could not be built
    #[error("Analysis client error: {0}")]
    Analysis(#[from] AnalysisError),
}
