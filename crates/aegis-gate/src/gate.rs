//! Gate runtime
//!
//! One task owns the document, the dedup state and the metrics. Debounce
//! triggers and request completions are discrete turns of a single
//! `select!` loop; requests themselves run in a `JoinSet` so the loop never
//! waits on the network.

use crate::banner::{BannerView, BANNER_MARKER};
use crate::config::{GateConfig, Presentation};
use crate::metrics::GateMetrics;
use crate::state::{Extraction, ExtractionState};
use crate::watcher::ChangeWatcher;
use aegis_domain::{AnalysisOutcome, Classifier, DocumentSource, NodeId, ThreatLevel};
use aegis_redact::RedactionEngine;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Sanitized text ready to be classified, tagged with its message epoch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Epoch of the message the text was extracted from
    pub epoch: u64,
    /// Element the text was read from; the verdict is drawn there
    pub container: NodeId,
    /// Redacted text; the only thing that leaves the process
    pub text: String,
}

type Completion<E> = (Dispatch, Result<AnalysisOutcome, E>);

/// The privacy gate
///
/// Extracts the active message, redacts it, sends it for classification and
/// presents the verdict. Drive it with [`Gate::run`], or step it by hand with
/// [`Gate::extract`] and [`Gate::apply`].
pub struct Gate<D, C> {
    config: GateConfig,
    document: D,
    classifier: Arc<C>,
    engine: RedactionEngine,
    state: ExtractionState,
    metrics: GateMetrics,
}

impl<D, C> Gate<D, C>
where
    D: DocumentSource,
    D::Error: fmt::Display,
    C: Classifier,
    C::Error: fmt::Display,
{
    /// Create a gate with the standard redaction rules
    pub fn new(config: GateConfig, document: D, classifier: C) -> Self {
        Self::with_engine(config, document, classifier, RedactionEngine::standard())
    }

    /// Create a gate with a custom redaction engine
    pub fn with_engine(
        config: GateConfig,
        document: D,
        classifier: C,
        engine: RedactionEngine,
    ) -> Self {
        Self {
            config,
            document,
            classifier: Arc::new(classifier),
            engine,
            state: ExtractionState::new(),
            metrics: GateMetrics::new(),
        }
    }

    /// Gate configuration
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The host document
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Dedup state
    pub fn state(&self) -> &ExtractionState {
        &self.state
    }

    /// Metrics so far
    pub fn metrics(&self) -> &GateMetrics {
        &self.metrics
    }

    /// The classifier requests are sent to
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    fn active_message(&self) -> Option<NodeId> {
        // Hosts keep hidden messages around; the last match is the visible one
        self.document.query_all(&self.config.selector).last().copied()
    }

    /// Run the extraction step
    ///
    /// Returns the text to classify when the active message is new and long
    /// enough. Any existing banner is removed first, since it belongs to the
    /// previous message.
    pub fn extract(&mut self) -> Option<Dispatch> {
        let Some(active) = self.active_message() else {
            self.metrics.no_match += 1;
            debug!("No element matches '{}'", self.config.selector);
            return None;
        };
        let Some(text) = self.document.inner_text(active) else {
            self.metrics.no_match += 1;
            debug!("Active message {} disappeared", active);
            return None;
        };

        let (epoch, text) = match self.state.observe(text, self.config.min_length) {
            Extraction::Fresh { epoch, text } => (epoch, text),
            Extraction::Unchanged => {
                self.metrics.skipped_unchanged += 1;
                debug!("Active message unchanged, skipping");
                return None;
            }
            Extraction::TooShort { length } => {
                self.metrics.skipped_short += 1;
                debug!(
                    "Active message too short ({} <= {} chars), skipping",
                    length, self.config.min_length
                );
                return None;
            }
        };

        self.remove_banner();

        let report = self.engine.redact_with_report(&text);
        for count in report.counts.iter().filter(|c| c.count > 0) {
            debug!("Message {}: {} x{}", epoch, count.rule, count.count);
        }
        self.metrics.redacted_tokens += report.total();
        self.metrics.dispatched += 1;

        info!(
            "Message {} extracted ({} chars, {} spans redacted)",
            epoch,
            report.text.chars().count(),
            report.total()
        );
        Some(Dispatch {
            epoch,
            container: active,
            text: report.text,
        })
    }

    /// Apply a request completion
    ///
    /// A completion is applied only while its message is still the one on
    /// screen: its epoch is the latest, the element is still the last match
    /// and its text is what was classified. Anything else is discarded, so a
    /// slow answer about a message the user has left never reaches the page.
    pub fn apply(&mut self, dispatch: &Dispatch, result: Result<AnalysisOutcome, C::Error>) {
        let epoch = dispatch.epoch;
        if !self.state.is_current(epoch) {
            self.metrics.stale_discarded += 1;
            debug!(
                "Discarding response for message {} (current is {})",
                epoch,
                self.state.epoch()
            );
            return;
        }
        if !self.is_displayed(dispatch.container) {
            self.metrics.stale_discarded += 1;
            debug!("Discarding response for message {}: no longer displayed", epoch);
            return;
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.metrics.failures += 1;
                warn!("Analysis request for message {} failed: {}", epoch, e);
                return;
            }
        };

        if let AnalysisOutcome::InvalidResponse(problem) = &outcome {
            warn!("Invalid analysis response for message {}: {}", epoch, problem);
        }

        let level = outcome.threat_level();
        if !self.should_present(level) {
            self.metrics.suppressed += 1;
            debug!("Message {} verdict '{}' not shown", epoch, level);
            return;
        }

        let view = BannerView::from_outcome(&outcome);
        let presented = match self.config.presentation {
            Presentation::Banner => self.show_banner(dispatch.container, &view),
            Presentation::Notification => {
                self.document.alert(&view.notification_text());
                true
            }
        };
        if presented {
            self.metrics.record_shown(level);
            info!("Message {} verdict: {}", epoch, level);
        }
    }

    /// The container is still the active message and still shows the
    /// text that was last processed
    fn is_displayed(&self, container: NodeId) -> bool {
        self.active_message() == Some(container)
            && self.document.inner_text(container).as_deref()
                == Some(self.state.last_processed_text())
    }

    fn should_present(&self, level: ThreatLevel) -> bool {
        match level {
            ThreatLevel::Threat => true,
            ThreatLevel::Safe => self.config.always_show_banner,
            ThreatLevel::Unknown => self.config.warn_on_invalid_response,
        }
    }

    fn show_banner(&mut self, container: NodeId, view: &BannerView) -> bool {
        if self.document.find_marked(BANNER_MARKER).is_some() {
            debug!("Banner already present");
            return false;
        }

        match self.document.insert_first_child(container, view.to_element()) {
            Ok(node) => {
                debug!("Banner inserted as {}", node);
                true
            }
            Err(e) => {
                warn!("Failed to insert banner: {}", e);
                false
            }
        }
    }

    fn remove_banner(&mut self) {
        if let Some(banner) = self.document.find_marked(BANNER_MARKER) {
            match self.document.remove(banner) {
                Ok(()) => debug!("Removed banner of previous message"),
                Err(e) => warn!("Failed to remove banner: {}", e),
            }
        }
    }

    fn settle(&mut self, joined: Result<Completion<C::Error>, JoinError>) {
        match joined {
            Ok((dispatch, result)) => self.apply(&dispatch, result),
            Err(e) => {
                self.metrics.failures += 1;
                error!("Analysis task failed: {}", e);
            }
        }
    }
}

impl<D, C> Gate<D, C>
where
    D: DocumentSource,
    D::Error: fmt::Display,
    C: Classifier + Send + Sync + 'static,
    C::Error: fmt::Display + Send + 'static,
{
    /// Run until the mutation stream closes
    ///
    /// Each debounce trigger runs the extraction step; each extracted message
    /// is classified in its own task. Once the stream closes, in-flight
    /// requests are awaited and the final metrics returned.
    pub async fn run<M>(mut self, mutations: UnboundedReceiver<M>) -> GateMetrics {
        let mut watcher = ChangeWatcher::new(mutations, self.config.debounce());
        let mut inflight: JoinSet<Completion<C::Error>> = JoinSet::new();

        info!(
            "Gate started (selector: '{}', debounce: {:?})",
            self.config.selector,
            watcher.window()
        );

        loop {
            tokio::select! {
                Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                    self.settle(joined);
                }
                trigger = watcher.next_trigger() => match trigger {
                    Some(trigger) => {
                        self.metrics.triggers += 1;
                        debug!("Trigger after {} mutations", trigger.mutations);
                        if let Some(dispatch) = self.extract() {
                            self.spawn_request(&mut inflight, dispatch);
                        }
                    }
                    None => break,
                },
            }
        }

        debug!("Mutation stream closed, {} requests in flight", inflight.len());
        while let Some(joined) = inflight.join_next().await {
            self.settle(joined);
        }

        info!("Gate stopped. Final metrics:\n{}", self.metrics.summary());
        self.metrics
    }

    fn spawn_request(&self, inflight: &mut JoinSet<Completion<C::Error>>, dispatch: Dispatch) {
        let classifier = Arc::clone(&self.classifier);
        inflight.spawn(async move {
            let result = classifier.classify(&dispatch.text).await;
            (dispatch, result)
        });
    }
}
