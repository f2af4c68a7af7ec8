//! HTTP classifier
//!
//! Posts sanitized text to the local classification service and decodes the
//! verdict.
//!
//! # Wire format
//!
//! ```text
//! POST /analyze
//! Content-Type: application/json
//!
//! { "text": "Pay {{MONEY_VAL}} to acc {{ACC_NUM}}" }
//!
//! 200 OK
//! { "is_threat": true, "reason": "False urgency", "risk_score": 91 }
//! ```
//!
//! No retries. A timeout is only applied when one is configured.

use crate::response::decode_verdict;
use crate::AnalysisError;
use aegis_domain::traits::Classifier;
use aegis_domain::AnalysisOutcome;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Default classification endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/analyze";

/// Request body for the analyze endpoint
#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

/// Classifier backed by the HTTP analysis service
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    endpoint: String,
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpClassifier {
    /// Create a classifier for `endpoint` with no request timeout
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use aegis_analysis::HttpClassifier;
    ///
    /// let classifier = HttpClassifier::new("http://localhost:8000/analyze").unwrap();
    /// ```
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AnalysisError> {
        Self::build(endpoint.into(), None)
    }

    /// Create a classifier that gives up on a request after `timeout`
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        Self::build(endpoint.into(), Some(timeout))
    }

    /// Create a classifier for [`DEFAULT_ENDPOINT`]
    pub fn default_endpoint() -> Result<Self, AnalysisError> {
        Self::new(DEFAULT_ENDPOINT)
    }

    fn build(endpoint: String, timeout: Option<Duration>) -> Result<Self, AnalysisError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisError::Client(e.to_string()))?;

        Ok(Self {
            endpoint,
            client,
            timeout,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Send sanitized text for classification
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the service is unreachable or the request times out
    /// - the service answers with a non-2xx status
    /// - the body is not JSON
    ///
    /// A JSON body with missing or mistyped fields is returned as
    /// `Ok(AnalysisOutcome::InvalidResponse(_))`.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisOutcome, AnalysisError> {
        debug!("Sending {} chars to {}", text.chars().count(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let json: Value = serde_json::from_str(&body)
            .map_err(|e| AnalysisError::Decode(format!("Failed to parse response: {}", e)))?;

        Ok(decode_verdict(&json))
    }
}

impl Classifier for HttpClassifier {
    type Error = AnalysisError;

    fn classify(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<AnalysisOutcome, Self::Error>> + Send {
        self.analyze(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_classifier_creation() {
        let classifier = HttpClassifier::new("http://localhost:8000/analyze").unwrap();
        assert_eq!(classifier.endpoint(), "http://localhost:8000/analyze");
        assert_eq!(classifier.timeout(), None);
    }

    #[test]
    fn test_http_classifier_default_endpoint() {
        let classifier = HttpClassifier::default_endpoint().unwrap();
        assert_eq!(classifier.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_http_classifier_with_timeout() {
        let classifier =
            HttpClassifier::with_timeout(DEFAULT_ENDPOINT, Duration::from_secs(5)).unwrap();
        assert_eq!(classifier.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(AnalyzeRequest { text: "hi {{EMAIL_ID}}" }).unwrap();
        assert_eq!(body, serde_json::json!({ "text": "hi {{EMAIL_ID}}" }));
    }
}
