//! Output formatting for the CLI.

use crate::cli::OutputFormat;
use crate::error::Result;
use aegis_domain::{AnalysisOutcome, ThreatLevel};
use aegis_gate::{BannerView, GateConfig, GateMetrics, Theme};
use aegis_redact::RedactionReport;
use colored::*;

/// Output formatter.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format redacted text, with per-rule counts in JSON mode.
    pub fn redaction(&self, report: &RedactionReport) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(report.text.clone()),
            OutputFormat::Json => {
                let counts: serde_json::Map<String, serde_json::Value> = report
                    .counts
                    .iter()
                    .map(|c| (c.rule.clone(), c.count.into()))
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "text": report.text,
                    "counts": counts,
                    "total": report.total(),
                }))?)
            }
        }
    }

    /// Format per-rule counts as text.
    pub fn redaction_counts(&self, report: &RedactionReport) -> String {
        let mut lines: Vec<String> = report
            .counts
            .iter()
            .map(|c| format!("  {:<8} {}", c.rule, c.count))
            .collect();
        lines.insert(0, self.info(&format!("{} span(s) redacted", report.total())));
        lines.join("\n")
    }

    /// Format an analysis outcome.
    pub fn outcome(&self, outcome: &AnalysisOutcome, sanitized: &str) -> Result<String> {
        let view = BannerView::from_outcome(outcome);
        match self.format {
            OutputFormat::Text => Ok(self.banner(&view)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "level": view.level.as_str(),
                "is_threat": view.level == ThreatLevel::Threat,
                "reason": view.reason,
                "risk_score": view.risk_score,
                "sanitized_text": sanitized,
            }))?),
        }
    }

    /// Format a banner for the terminal.
    pub fn banner(&self, view: &BannerView) -> String {
        let title = format!("{} {}", view.theme.icon, view.theme.title);
        format!(
            "{}\n  {}\n  {}",
            self.colorize_level(&title, view.level),
            view.reason,
            view.score_line()
        )
    }

    /// Format a notification raised by the gate.
    pub fn notification(&self, text: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({ "notification": text }).to_string(),
            OutputFormat::Text => {
                let (title, rest) = text.split_once('\n').unwrap_or((text, ""));
                let level = [ThreatLevel::Threat, ThreatLevel::Safe, ThreatLevel::Unknown]
                    .into_iter()
                    .find(|level| title.contains(Theme::for_level(*level).title))
                    .unwrap_or(ThreatLevel::Unknown);
                let body: Vec<&str> = rest.lines().filter(|l| !l.is_empty()).collect();
                let mut lines = vec![self.colorize_level(title, level)];
                lines.extend(body.iter().map(|l| format!("  {}", l)));
                lines.join("\n")
            }
        }
    }

    /// Format the effective configuration.
    pub fn config(&self, config: &GateConfig) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(config.to_toml()?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        }
    }

    /// Format gate metrics.
    pub fn metrics(&self, metrics: &GateMetrics) -> String {
        metrics.summary()
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn colorize_level(&self, text: &str, level: ThreatLevel) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        let colored = match level {
            ThreatLevel::Threat => text.red(),
            ThreatLevel::Safe => text.green(),
            ThreatLevel::Unknown => text.yellow(),
        };
        colored.bold().to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_domain::Verdict;
    use aegis_redact::RedactionEngine;

    fn plain() -> Formatter {
        Formatter::new(OutputFormat::Text, false)
    }

    #[test]
    fn test_banner_text() {
        let view = BannerView::from_outcome(&Verdict::threat("Fake invoice", 88.0).into());
        assert_eq!(
            plain().banner(&view),
            "⚠️ PHISHING THREAT DETECTED\n  Fake invoice\n  AI Risk Confidence: 88%"
        );
    }

    #[test]
    fn test_outcome_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .outcome(&Verdict::safe("Newsletter", 5.0).into(), "Hi {{EMAIL_ID}}")
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["level"], "safe");
        assert_eq!(json["is_threat"], false);
        assert_eq!(json["risk_score"], 5.0);
        assert_eq!(json["sanitized_text"], "Hi {{EMAIL_ID}}");
    }

    #[test]
    fn test_invalid_outcome_json_has_null_score() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .outcome(&AnalysisOutcome::InvalidResponse("bad".to_string()), "x")
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["level"], "unknown");
        assert!(json["risk_score"].is_null());
    }

    #[test]
    fn test_redaction_json() {
        let report = RedactionEngine::standard().redact_with_report("Call 0712345678 now");
        let formatter = Formatter::new(OutputFormat::Json, false);
        let json: serde_json::Value =
            serde_json::from_str(&formatter.redaction(&report).unwrap()).unwrap();

        assert_eq!(json["text"], "Call {{PHONE_ID}} now");
        assert_eq!(json["counts"]["phone"], 1);
        assert_eq!(json["total"], 1);
    }

    #[test]
    fn test_redaction_counts() {
        let report = RedactionEngine::standard().redact_with_report("Mail a@b.com or c@d.org");
        let output = plain().redaction_counts(&report);
        assert!(output.starts_with("ℹ 2 span(s) redacted"));
        assert!(output.contains("  email    2"));
    }

    #[test]
    fn test_notification_text() {
        let output = plain().notification(
            "⚠️ PHISHING THREAT DETECTED\n\nFake invoice\n\nAI Risk Confidence: 88%",
        );
        assert_eq!(
            output,
            "⚠️ PHISHING THREAT DETECTED\n  Fake invoice\n  AI Risk Confidence: 88%"
        );
    }

    #[test]
    fn test_config_toml() {
        let output = plain().config(&GateConfig::default()).unwrap();
        assert!(output.contains("selector = \".a3s.aiL\""));
        assert!(output.contains("debounce_ms = 1000"));
    }

    #[test]
    fn test_colorize_disabled() {
        assert_eq!(plain().warning("offline"), "⚠ offline");
    }
}
