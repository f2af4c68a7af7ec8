//! Aegis Analysis Client
//!
//! Implementations of the `Classifier` trait from `aegis-domain`.
//!
//! # Classifiers
//!
//! - `HttpClassifier`: the local threat-classification service over HTTP
//! - `MockClassifier`: deterministic outcomes for testing
//!
//! # Examples
//!
//! ```
//! use aegis_analysis::MockClassifier;
//! use aegis_domain::{Classifier, ThreatLevel, Verdict};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let classifier = MockClassifier::new(Verdict::threat("False urgency", 91.0));
//! let outcome = classifier.classify("Pay {{MONEY_VAL}} now").await.unwrap();
//! assert_eq!(outcome.threat_level(), ThreatLevel::Threat);
//! # }
//! ```

#![warn(missing_docs)]

mod error;
pub mod http;
pub mod response;

use aegis_domain::traits::Classifier;
use aegis_domain::AnalysisOutcome;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use error::AnalysisError;
pub use http::{HttpClassifier, DEFAULT_ENDPOINT};
pub use response::decode_verdict;

/// Mock classifier for deterministic testing
///
/// Returns pre-configured outcomes without any network calls. Every request
/// text is recorded so tests can check what would have left the client.
/// When several needles occur in a text, the one registered first wins.
///
/// # Examples
///
/// ```
/// use aegis_analysis::MockClassifier;
/// use aegis_domain::Verdict;
///
/// let mut classifier = MockClassifier::default();
/// classifier.add_response("phish", Verdict::threat("Authority mimicry", 80.0));
/// classifier.add_error("offline");
/// assert_eq!(classifier.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockClassifier {
    default_outcome: AnalysisOutcome,
    responses: Arc<Mutex<Vec<(String, MockReply)>>>,
    delays: Arc<Mutex<Vec<(String, Duration)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Outcome(AnalysisOutcome),
    Error,
}

impl MockClassifier {
    /// Create a classifier returning `outcome` for every text
    pub fn new(outcome: impl Into<AnalysisOutcome>) -> Self {
        Self {
            default_outcome: outcome.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            delays: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return `outcome` for requests whose text contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, outcome: impl Into<AnalysisOutcome>) {
        upsert(
            &mut self.responses.lock().unwrap(),
            needle.into(),
            MockReply::Outcome(outcome.into()),
        );
    }

    /// Fail requests whose text contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        upsert(&mut self.responses.lock().unwrap(), needle.into(), MockReply::Error);
    }

    /// Delay the answer to requests whose text contains `needle`
    pub fn add_delay(&mut self, needle: impl Into<String>, delay: Duration) {
        upsert(&mut self.delays.lock().unwrap(), needle.into(), delay);
    }

    /// Number of classify calls so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Texts received so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Forget recorded requests
    pub fn reset(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn reply_for(&self, text: &str) -> MockReply {
        self.responses
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| MockReply::Outcome(self.default_outcome.clone()))
    }

    fn delay_for(&self, text: &str) -> Duration {
        self.delays
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, delay)| *delay)
            .unwrap_or_default()
    }
}

/// Replace the entry for `needle` in place, or append it
fn upsert<T>(entries: &mut Vec<(String, T)>, needle: String, value: T) {
    match entries.iter_mut().find(|(existing, _)| *existing == needle) {
        Some(entry) => entry.1 = value,
        None => entries.push((needle, value)),
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new(aegis_domain::Verdict::safe("Default mock verdict", 0.0))
    }
}

impl Classifier for MockClassifier {
    type Error = AnalysisError;

    fn classify(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<AnalysisOutcome, Self::Error>> + Send {
        self.requests.lock().unwrap().push(text.to_string());
        let reply = self.reply_for(text);
        let delay = self.delay_for(text);

        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match reply {
                MockReply::Outcome(outcome) => Ok(outcome),
                MockReply::Error => Err(AnalysisError::Communication("Mock error".to_string())),
            }
        }
    }
}
