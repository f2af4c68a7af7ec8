//! Aegis Gate
//!
//! Watches a host document for newly opened messages, redacts them and sends
//! only the sanitized text for threat classification, then presents the
//! verdict as a banner on the active message.
//!
//! # Pipeline
//!
//! ```text
//! mutation -> ChangeWatcher (debounce) -> extract -> dedup gate
//!          -> redact -> classify (JoinSet task) -> epoch check -> banner
//! ```
//!
//! # Examples
//!
//! Stepping the gate by hand; [`Gate::run`] does the same driven by document
//! mutations.
//!
//! ```
//! use aegis_analysis::MockClassifier;
//! use aegis_domain::{Classifier, DocumentSource, Element, Verdict};
//! use aegis_gate::{Gate, GateConfig, MemoryDocument, BANNER_MARKER};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let document = MemoryDocument::new();
//! let body = Element::new("div")
//!     .with_class("a3s")
//!     .with_class("aiL")
//!     .with_content("Your mailbox is full. Call 0712345678 today or lose access.");
//! document.append_child(document.root(), body).unwrap();
//!
//! let classifier = MockClassifier::new(Verdict::threat("Credential harvesting", 94.0));
//! let mut gate = Gate::new(GateConfig::default(), document.clone(), classifier.clone());
//!
//! let dispatch = gate.extract().unwrap();
//! assert!(dispatch.text.contains("{{PHONE_ID}}"));
//!
//! let outcome = classifier.classify(&dispatch.text).await;
//! gate.apply(&dispatch, outcome);
//! assert!(document.find_marked(BANNER_MARKER).is_some());
//! # }
//! ```

#![warn(missing_docs)]

pub mod banner;
pub mod config;
pub mod document;
mod error;
mod gate;
pub mod metrics;
pub mod state;
pub mod watcher;

pub use banner::{BannerView, Theme, BANNER_MARKER};
pub use config::{GateConfig, Presentation, DEFAULT_SELECTOR};
pub use document::{parse_selector, DocumentError, MemoryDocument, Mutation, MutationKind};
pub use error::GateError;
pub use gate::{Dispatch, Gate};
pub use metrics::GateMetrics;
pub use state::{Extraction, ExtractionState};
pub use watcher::{ChangeWatcher, Trigger};
