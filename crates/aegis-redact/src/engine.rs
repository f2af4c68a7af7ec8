//! Redaction engine - applies the rule set in precedence order

use crate::error::RedactError;
use crate::rule::{standard_rules, PatternRule};
use std::sync::LazyLock;
use tracing::debug;

static STANDARD_ENGINE: LazyLock<RedactionEngine> = LazyLock::new(RedactionEngine::standard);

/// Redact `text` with the built-in rule set
///
/// # Examples
///
/// ```
/// assert_eq!(
///     aegis_redact::redact("Contact me at a@b.com"),
///     "Contact me at {{EMAIL_ID}}"
/// );
/// ```
pub fn redact(text: &str) -> String {
    STANDARD_ENGINE.redact(text)
}

/// Number of replacements one rule made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCount {
    /// Rule name
    pub rule: String,
    /// Replacements made
    pub count: usize,
}

/// Sanitized text plus what was removed from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionReport {
    /// The sanitized text
    pub text: String,
    /// Per-rule replacement counts, in execution order
    pub counts: Vec<RuleCount>,
}

impl RedactionReport {
    /// Total replacements across all rules
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    /// Replacements made by a named rule
    pub fn count_for(&self, rule: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.rule == rule)
            .map_or(0, |c| c.count)
    }
}

/// Ordered set of pattern rules
///
/// Each rule rewrites the output of the previous one, so a span already turned
/// into a token can't be matched again by a broader rule further down.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    rules: Vec<PatternRule>,
}

impl RedactionEngine {
    /// Engine with the built-in rules (email, phone, money, gov_id, account)
    pub fn standard() -> Self {
        Self {
            rules: standard_rules(),
        }
    }

    /// Engine with a custom rule list
    ///
    /// Rules are sorted by precedence. Two rules with the same precedence are
    /// rejected.
    pub fn with_rules(mut rules: Vec<PatternRule>) -> Result<Self, RedactError> {
        rules.sort_by_key(|r| r.precedence());
        if let Some(pair) = rules
            .windows(2)
            .find(|w| w[0].precedence() == w[1].precedence())
        {
            return Err(RedactError::DuplicatePrecedence {
                first: pair[0].name().to_string(),
                second: pair[1].name().to_string(),
                precedence: pair[0].precedence(),
            });
        }
        Ok(Self { rules })
    }

    /// Rules in execution order
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Redact `text`; empty input gives empty output
    pub fn redact(&self, text: &str) -> String {
        self.redact_with_report(text).text
    }

    /// Redact `text` and report how many replacements each rule made
    pub fn redact_with_report(&self, text: &str) -> RedactionReport {
        let mut counts = Vec::with_capacity(self.rules.len());
        if text.is_empty() {
            return RedactionReport {
                text: String::new(),
                counts,
            };
        }

        let mut current = text.to_string();
        for rule in &self.rules {
            let (replaced, count) = rule.apply(&current);
            if count > 0 {
                current = replaced.into_owned();
            }
            counts.push(RuleCount {
                rule: rule.name().to_string(),
                count,
            });
        }

        let report = RedactionReport {
            text: current,
            counts,
        };
        debug!(
            "Redacted {} spans ({} chars in, {} chars out)",
            report.total(),
            text.chars().count(),
            report.text.chars().count()
        );
        report
    }
}

impl Default for RedactionEngine {
    fn default() -> Self {
        Self::standard()
    }
}
