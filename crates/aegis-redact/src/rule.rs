//! Pattern rules and the built-in rule set

use crate::error::RedactError;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Token substituted for email addresses
pub const EMAIL_TOKEN: &str = "{{EMAIL_ID}}";
/// Token substituted for phone numbers
pub const PHONE_TOKEN: &str = "{{PHONE_ID}}";
/// Token substituted for currency amounts
pub const MONEY_TOKEN: &str = "{{MONEY_VAL}}";
/// Token substituted for government tax identifiers
pub const GOV_ID_TOKEN: &str = "{{GOV_ID}}";
/// Token substituted for long digit runs
pub const ACCOUNT_TOKEN: &str = "{{ACC_NUM}}";

// ── Email ──────────────────────────────────────────────────────────────────
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9_.\-]+@[a-z0-9_.\-]+\.[a-z0-9_]{2,4}\b").unwrap()
});

// ── Kenyan phone numbers: +2547.., 07.., 01.. ─────────────────────────────
static RE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\+254|\b0)[17][0-9]{8}\b").unwrap());

// ── Currency: KES 50,000 / Ksh. 200 / $500 / 50,000/= ─────────────────────
static RE_MONEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:ksh|kes|sh|usd)|[$€])\.?\s?[0-9](?:[0-9,]*[0-9])?(?:\.[0-9]{2})?|\b[0-9](?:[0-9,]*[0-9])?/=",
    )
    .unwrap()
});

// ── KRA PIN: A000000000Z ──────────────────────────────────────────────────
static RE_GOV_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][0-9]{9}[A-Z]\b").unwrap());

// ── Bare account-like digit runs ──────────────────────────────────────────
static RE_ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]{8,16}\b").unwrap());

/// A named pattern that replaces every match with a fixed token
///
/// Rules run in ascending `precedence`. A narrow rule must come before any
/// broader rule that could match the same characters.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    matcher: Regex,
    replacement_token: String,
    precedence: u32,
}

impl PatternRule {
    /// Compile a rule from a pattern string
    ///
    /// # Examples
    ///
    /// ```
    /// use aegis_redact::PatternRule;
    ///
    /// let rule = PatternRule::new("ticket", r"\bTKT-[0-9]+\b", "{{TICKET}}", 10).unwrap();
    /// assert_eq!(rule.apply("see TKT-42").0, "see {{TICKET}}");
    /// ```
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        replacement_token: impl Into<String>,
        precedence: u32,
    ) -> Result<Self, RedactError> {
        let name = name.into();
        let matcher = Regex::new(pattern).map_err(|source| RedactError::InvalidPattern {
            name: name.clone(),
            source,
        })?;
        Self::from_regex(name, matcher, replacement_token, precedence)
    }

    /// Build a rule from an already compiled regex
    pub fn from_regex(
        name: impl Into<String>,
        matcher: Regex,
        replacement_token: impl Into<String>,
        precedence: u32,
    ) -> Result<Self, RedactError> {
        let name = name.into();
        let replacement_token = replacement_token.into();
        if replacement_token.is_empty() {
            return Err(RedactError::EmptyToken(name));
        }
        Ok(Self {
            name,
            matcher,
            replacement_token,
            precedence,
        })
    }

    /// Rule name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token written in place of each match
    pub fn replacement_token(&self) -> &str {
        &self.replacement_token
    }

    /// Position of the rule in the execution order
    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    /// Regex source of the rule
    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    /// Replace every match in `text`, returning the new text and the number of
    /// replacements made
    ///
    /// The token is inserted literally; `$` in a token is not expanded.
    pub fn apply<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let mut count = 0;
        let token = self.replacement_token.as_str();
        let replaced = self.matcher.replace_all(text, |_: &Captures<'_>| {
            count += 1;
            token
        });
        (replaced, count)
    }
}

/// The built-in rules in execution order: email, phone, money, gov_id, account
pub fn standard_rules() -> Vec<PatternRule> {
    vec![
        builtin("email", &RE_EMAIL, EMAIL_TOKEN, 10),
        builtin("phone", &RE_PHONE, PHONE_TOKEN, 20),
        builtin("money", &RE_MONEY, MONEY_TOKEN, 30),
        builtin("gov_id", &RE_GOV_ID, GOV_ID_TOKEN, 40),
        // Must stay last: it would otherwise eat the digits of every rule above.
        builtin("account", &RE_ACCOUNT, ACCOUNT_TOKEN, 50),
    ]
}

fn builtin(
    name: &str,
    matcher: &LazyLock<Regex>,
    token: &str,
    precedence: u32,
) -> PatternRule {
    PatternRule {
        name: name.to_string(),
        matcher: Regex::clone(matcher),
        replacement_token: token.to_string(),
        precedence,
    }
}
