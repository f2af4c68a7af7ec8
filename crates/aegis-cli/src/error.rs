//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gate error
    #[error("{0}")]
    Gate(#[from] aegis_gate::GateError),

    /// Analysis request failed
    #[error("Analysis failed: {0}")]
    Analysis(#[from] aegis_analysis::AnalysisError),

    /// Document error
    #[error("Document error: {0}")]
    Document(#[from] aegis_gate::DocumentError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Background task failed
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
