//! Metrics collected while the gate runs

use aegis_domain::ThreatLevel;
use std::collections::HashMap;

/// Counters for one gate run
///
/// Counts only; no message content is ever kept here.
#[derive(Debug, Clone, Default)]
pub struct GateMetrics {
    /// Debounce triggers received
    pub triggers: usize,

    /// Triggers where the selector matched nothing
    pub no_match: usize,

    /// Extractions suppressed because the text was unchanged
    pub skipped_unchanged: usize,

    /// Extractions suppressed because the text was too short
    pub skipped_short: usize,

    /// Classification requests sent
    pub dispatched: usize,

    /// Tokens substituted by redaction across all requests
    pub redacted_tokens: usize,

    /// Verdicts presented, per threat level
    pub shown: HashMap<ThreatLevel, usize>,

    /// Verdicts received but not shown under the current configuration
    pub suppressed: usize,

    /// Responses discarded because a newer message was active
    pub stale_discarded: usize,

    /// Requests that failed in transport
    pub failures: usize,
}

impl GateMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a presented verdict
    pub fn record_shown(&mut self, level: ThreatLevel) {
        *self.shown.entry(level).or_insert(0) += 1;
    }

    /// Presented verdicts of one level
    pub fn shown_for(&self, level: ThreatLevel) -> usize {
        self.shown.get(&level).copied().unwrap_or(0)
    }

    /// Presented verdicts across all levels
    pub fn total_shown(&self) -> usize {
        self.shown.values().sum()
    }

    /// Responses that reached the presentation step or were dropped on the way
    pub fn total_settled(&self) -> usize {
        self.total_shown() + self.suppressed + self.stale_discarded + self.failures
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Gate Metrics Summary".to_string(),
            "====================".to_string(),
            format!("Triggers: {}", self.triggers),
            format!("No active message: {}", self.no_match),
            format!("Skipped (unchanged): {}", self.skipped_unchanged),
            format!("Skipped (too short): {}", self.skipped_short),
            format!("Requests sent: {}", self.dispatched),
            format!("Tokens redacted: {}", self.redacted_tokens),
            String::new(),
        ];

        if !self.shown.is_empty() {
            lines.push("Verdicts shown:".to_string());
            for level in [ThreatLevel::Threat, ThreatLevel::Safe, ThreatLevel::Unknown] {
                let count = self.shown_for(level);
                if count > 0 {
                    lines.push(format!("  {}: {}", level, count));
                }
            }
            lines.push(format!("  Total: {}", self.total_shown()));
            lines.push(String::new());
        }

        lines.push(format!("Suppressed: {}", self.suppressed));
        lines.push(format!("Stale discarded: {}", self.stale_discarded));
        lines.push(format!("Failures: {}", self.failures));
        lines.push(format!(
            "Responses settled: {} of {}",
            self.total_settled(),
            self.dispatched
        ));

        lines.join("\n")
    }
}
