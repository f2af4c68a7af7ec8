//! Verdict module - what the classification service tells us about a message

use std::fmt;

/// Structured classification result returned by the threat-assessment service
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Whether the service considers the message a threat
    pub is_threat: bool,

    /// Free-text explanation from the service
    pub reason: String,

    /// Confidence score, 0-100
    pub risk_score: f64,
}

impl Verdict {
    /// Create a verdict flagging a threat
    ///
    /// # Examples
    ///
    /// ```
    /// use aegis_domain::Verdict;
    ///
    /// let verdict = Verdict::threat("False urgency", 92.0);
    /// assert!(verdict.is_threat);
    /// ```
    pub fn threat(reason: impl Into<String>, risk_score: f64) -> Self {
        Self {
            is_threat: true,
            reason: reason.into(),
            risk_score,
        }
    }

    /// Create a verdict clearing the message
    pub fn safe(reason: impl Into<String>, risk_score: f64) -> Self {
        Self {
            is_threat: false,
            reason: reason.into(),
            risk_score,
        }
    }
}

/// Result of decoding a classification response
///
/// A response that does not carry every expected field is never coerced into
/// a "safe" verdict; it is kept apart as `InvalidResponse`.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Well-formed verdict
    Verdict(Verdict),

    /// The response failed the schema check (description of the problem)
    InvalidResponse(String),
}

impl AnalysisOutcome {
    /// Threat level to present for this outcome
    pub fn threat_level(&self) -> ThreatLevel {
        match self {
            AnalysisOutcome::Verdict(v) if v.is_threat => ThreatLevel::Threat,
            AnalysisOutcome::Verdict(_) => ThreatLevel::Safe,
            AnalysisOutcome::InvalidResponse(_) => ThreatLevel::Unknown,
        }
    }

    /// The verdict, if the response was well-formed
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            AnalysisOutcome::Verdict(v) => Some(v),
            AnalysisOutcome::InvalidResponse(_) => None,
        }
    }
}

impl From<Verdict> for AnalysisOutcome {
    fn from(verdict: Verdict) -> Self {
        AnalysisOutcome::Verdict(verdict)
    }
}

/// Threat level shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatLevel {
    /// The service flagged the message
    Threat,

    /// The service cleared the message
    Safe,

    /// The service answered with something we could not validate
    Unknown,
}

impl ThreatLevel {
    /// Get the level name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Threat => "threat",
            ThreatLevel::Safe => "safe",
            ThreatLevel::Unknown => "unknown",
        }
    }

    /// Parse a level from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "threat" => Some(ThreatLevel::Threat),
            "safe" => Some(ThreatLevel::Safe),
            "unknown" => Some(ThreatLevel::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThreatLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid threat level: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threat_level_from_outcome() {
        let threat: AnalysisOutcome = Verdict::threat("urgency", 90.0).into();
        let safe: AnalysisOutcome = Verdict::safe("looks fine", 5.0).into();
        let invalid = AnalysisOutcome::InvalidResponse("missing is_threat".to_string());

        assert_eq!(threat.threat_level(), ThreatLevel::Threat);
        assert_eq!(safe.threat_level(), ThreatLevel::Safe);
        assert_eq!(invalid.threat_level(), ThreatLevel::Unknown);
    }

    #[test]
    fn test_invalid_response_is_never_safe() {
        let invalid = AnalysisOutcome::InvalidResponse(String::new());
        assert_ne!(invalid.threat_level(), ThreatLevel::Safe);
        assert!(invalid.verdict().is_none());
    }

    #[test]
    fn test_threat_level_parse() {
        assert_eq!(ThreatLevel::parse("THREAT"), Some(ThreatLevel::Threat));
        assert_eq!("safe".parse::<ThreatLevel>(), Ok(ThreatLevel::Safe));
        assert!("maybe".parse::<ThreatLevel>().is_err());
        assert_eq!(ThreatLevel::Unknown.to_string(), "unknown");
    }
}
