//! Aegis Domain Layer
//!
//! Core model for the Aegis privacy gate. Like every domain crate in this
//! workspace it has no external dependencies and only defines value objects
//! and the trait boundaries that infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **Verdict**: the structured answer of the threat-classification service
//! - **AnalysisOutcome**: a verdict, or a response that failed the schema check
//! - **ThreatLevel**: what the banner shows (threat, safe, unknown)
//! - **DocumentSource**: the host document as a queryable, mutable capability
//! - **Classifier**: the outbound classification boundary
//!
//! ## Architecture
//!
//! ```text
//! DocumentSource → Gate → Redaction → Classifier → AnalysisOutcome → Banner
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use document::{DocumentSource, Element, NodeId};
pub use traits::Classifier;
pub use verdict::{AnalysisOutcome, ThreatLevel, Verdict};
