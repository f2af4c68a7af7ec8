//! Error types for the redaction engine

use thiserror::Error;

/// Errors that can occur while building a redaction engine
#[derive(Error, Debug)]
pub enum RedactError {
    /// A rule's pattern failed to compile
    #[error("Invalid pattern for rule '{name}': {source}")]
    InvalidPattern {
        /// Rule name
        name: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Two rules share a precedence, so their order would be ambiguous
    #[error("Rules '{first}' and '{second}' share precedence {precedence}")]
    DuplicatePrecedence {
        /// First rule name
        first: String,
        /// Second rule name
        second: String,
        /// Shared precedence
        precedence: u32,
    },

    /// A rule was given an empty replacement token
    #[error("Rule '{0}' has an empty replacement token")]
    EmptyToken(String),
}
