//! Banner rendering
//!
//! Turns an analysis outcome into the element prepended to the active
//! message, or into the text of a blocking notification.

use aegis_domain::{AnalysisOutcome, Element, ThreatLevel};

/// Identity marker of the banner root; at most one node carries it
pub const BANNER_MARKER: &str = "aegis-x-root";

/// Reason shown when the service's answer failed the schema check
const UNKNOWN_REASON: &str =
    "The analysis service returned a response that could not be verified. Treat this message with caution.";

/// Colours, icon and title for a threat level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Accent colour (border and title)
    pub color: &'static str,
    /// Background colour
    pub background: &'static str,
    /// Leading icon
    pub icon: &'static str,
    /// Banner title
    pub title: &'static str,
}

impl Theme {
    /// Theme for a threat level
    pub fn for_level(level: ThreatLevel) -> Self {
        match level {
            ThreatLevel::Threat => Self {
                color: "#d93025",
                background: "#FEF2F2",
                icon: "⚠️",
                title: "PHISHING THREAT DETECTED",
            },
            ThreatLevel::Safe => Self {
                color: "#188038",
                background: "#F0FDF4",
                icon: "🛡️",
                title: "Verified Safe",
            },
            ThreatLevel::Unknown => Self {
                color: "#b06000",
                background: "#FFFBEB",
                icon: "❔",
                title: "Risk Unknown",
            },
        }
    }
}

/// Everything needed to present one outcome
#[derive(Debug, Clone, PartialEq)]
pub struct BannerView {
    /// Threat level of the outcome
    pub level: ThreatLevel,
    /// Presentation theme
    pub theme: Theme,
    /// Reason as plain text (unescaped)
    pub reason: String,
    /// Risk score, absent for invalid responses
    pub risk_score: Option<f64>,
}

impl BannerView {
    /// Build the view for an outcome
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Self {
        let level = outcome.threat_level();
        let (reason, risk_score) = match outcome.verdict() {
            Some(verdict) => (verdict.reason.clone(), Some(verdict.risk_score)),
            None => (UNKNOWN_REASON.to_string(), None),
        };

        Self {
            level,
            theme: Theme::for_level(level),
            reason,
            risk_score,
        }
    }

    /// "AI Risk Confidence: N%", or "n/a" without a score
    pub fn score_line(&self) -> String {
        match self.risk_score {
            Some(score) => format!("AI Risk Confidence: {}%", score),
            None => "AI Risk Confidence: n/a".to_string(),
        }
    }

    /// Text of the blocking notification
    pub fn notification_text(&self) -> String {
        format!(
            "{} {}\n\n{}\n\n{}",
            self.theme.icon,
            self.theme.title,
            self.reason,
            self.score_line()
        )
    }

    /// Markup of the isolated banner subtree
    pub fn markup(&self) -> String {
        let Theme {
            color,
            background,
            icon,
            title,
        } = self.theme;

        format!(
            r#"<style>
.banner {{ font-family: 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; background-color: {background}; border: 1px solid {color}; border-left: 6px solid {color}; border-radius: 4px; padding: 16px; display: flex; align-items: flex-start; }}
.icon {{ font-size: 24px; margin-right: 16px; }}
.content {{ flex: 1; }}
.title {{ color: {color}; font-weight: 700; font-size: 16px; margin: 0 0 4px 0; text-transform: uppercase; }}
.message {{ color: #374151; font-size: 14px; line-height: 1.5; margin: 0; }}
.score {{ font-size: 12px; color: #6B7280; margin-top: 8px; }}
</style>
<div class="banner">
<div class="icon">{icon}</div>
<div class="content">
<h3 class="title">{title}</h3>
<p class="message">{reason}</p>
<div class="score">{score}</div>
</div>
</div>"#,
            reason = escape_html(&self.reason),
            score = escape_html(&self.score_line()),
        )
    }

    /// Banner root element: isolated, marked, ready to prepend
    pub fn to_element(&self) -> Element {
        Element::new("div")
            .with_marker(BANNER_MARKER)
            .with_class(format!("aegis-{}", self.level.as_str()))
            .with_content(self.markup())
            .isolated()
    }
}

/// Escape text for inclusion in HTML content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_domain::Verdict;

    #[test]
    fn test_threat_view() {
        let outcome = AnalysisOutcome::from(Verdict::threat("False urgency", 92.0));
        let view = BannerView::from_outcome(&outcome);

        assert_eq!(view.level, ThreatLevel::Threat);
        assert_eq!(view.theme.title, "PHISHING THREAT DETECTED");
        assert_eq!(view.theme.color, "#d93025");
        assert_eq!(view.score_line(), "AI Risk Confidence: 92%");
    }

    #[test]
    fn test_safe_view() {
        let view = BannerView::from_outcome(&Verdict::safe("Routine newsletter", 3.5).into());
        assert_eq!(view.level, ThreatLevel::Safe);
        assert_eq!(view.theme.icon, "🛡️");
        assert_eq!(view.score_line(), "AI Risk Confidence: 3.5%");
    }

    #[test]
    fn test_invalid_response_view_is_cautionary() {
        let outcome = AnalysisOutcome::InvalidResponse("Missing 'is_threat'".to_string());
        let view = BannerView::from_outcome(&outcome);

        assert_eq!(view.level, ThreatLevel::Unknown);
        assert_eq!(view.theme.title, "Risk Unknown");
        assert!(view.reason.contains("caution"));
        assert_eq!(view.score_line(), "AI Risk Confidence: n/a");
    }

    #[test]
    fn test_element_is_isolated_and_marked() {
        let view = BannerView::from_outcome(&Verdict::threat("x", 80.0).into());
        let element = view.to_element();

        assert_eq!(element.marker.as_deref(), Some(BANNER_MARKER));
        assert!(element.isolated);
        assert_eq!(element.classes, vec!["aegis-threat".to_string()]);
        assert!(element.content.contains("border-left: 6px solid #d93025"));
        assert!(element.content.contains("AI Risk Confidence: 80%"));
    }

    #[test]
    fn test_reason_is_escaped_in_markup() {
        let view = BannerView::from_outcome(
            &Verdict::threat("<img src=x onerror=alert(1)> & more", 99.0).into(),
        );
        let markup = view.markup();

        assert!(!markup.contains("<img"));
        assert!(markup.contains("&lt;img src=x onerror=alert(1)&gt; &amp; more"));
    }

    #[test]
    fn test_notification_text() {
        let view = BannerView::from_outcome(&Verdict::threat("Fake invoice", 88.0).into());
        assert_eq!(
            view.notification_text(),
            "⚠️ PHISHING THREAT DETECTED\n\nFake invoice\n\nAI Risk Confidence: 88%"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b"), "a &lt; b");
        assert_eq!(escape_html("\"q\" 'r'"), "&quot;q&quot; &#39;r&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
