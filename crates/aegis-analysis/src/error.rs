//! Error types for the analysis client

use thiserror::Error;

/// Transport failures talking to the classification service
///
/// A response that arrives as JSON but lacks the expected fields is not an
/// error; see [`aegis_domain::AnalysisOutcome::InvalidResponse`].
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Endpoint unreachable, connection reset, timeout
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-2xx response
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code
        status: u16,
        /// Response body (possibly empty)
        body: String,
    },

    /// Response body is not JSON
    #[error("Malformed response: {0}")]
    Decode(String),

    /// HTTP client could not be constructed
    #[error("Client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnalysisError::Communication(format!("Request timed out: {}", e))
        } else if e.is_decode() {
            AnalysisError::Decode(e.to_string())
        } else {
            AnalysisError::Communication(format!("Request failed: {}", e))
        }
    }
}
