//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::AnalysisOutcome;
use std::future::Future;

/// Trait for the outbound threat-classification call
///
/// Implemented by the infrastructure layer (aegis-analysis). Implementations
/// receive text that has already been through redaction.
pub trait Classifier {
    /// Error type for transport failures
    type Error;

    /// Classify sanitized text
    ///
    /// A response that arrives but fails the schema check is
    /// `Ok(AnalysisOutcome::InvalidResponse(_))`, not an error.
    fn classify(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<AnalysisOutcome, Self::Error>> + Send;
}
