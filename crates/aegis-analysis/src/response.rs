//! Schema check for classification responses

use aegis_domain::{AnalysisOutcome, Verdict};
use serde_json::Value;
use tracing::warn;

/// Highest accepted `risk_score`
pub const MAX_RISK_SCORE: f64 = 100.0;

/// Decode a JSON response body into an outcome
///
/// Every field must be present with the right type; nothing is defaulted.
/// Anything else becomes `AnalysisOutcome::InvalidResponse`.
pub fn decode_verdict(json: &Value) -> AnalysisOutcome {
    match parse_verdict_json(json) {
        Ok(verdict) => AnalysisOutcome::Verdict(verdict),
        Err(problem) => {
            warn!("Classification response failed schema check: {}", problem);
            AnalysisOutcome::InvalidResponse(problem)
        }
    }
}

fn parse_verdict_json(json: &Value) -> Result<Verdict, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Verdict is not a JSON object".to_string())?;

    let is_threat = obj
        .get("is_threat")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| "Missing or invalid 'is_threat'".to_string())?;

    let reason = obj
        .get("reason")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing or invalid 'reason'".to_string())?
        .to_string();

    let risk_score = obj
        .get("risk_score")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| "Missing or invalid 'risk_score'".to_string())?;

    if !(0.0..=MAX_RISK_SCORE).contains(&risk_score) {
        return Err(format!(
            "'risk_score' out of range: {} (expected 0-{})",
            risk_score, MAX_RISK_SCORE
        ));
    }

    Ok(Verdict {
        is_threat,
        reason,
        risk_score,
    })
}
