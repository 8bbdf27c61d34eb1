//! Defensive parsing of inference responses.
//!
//! The contract is strict JSON, but models wrap output in code fences or
//! pad it with prose often enough that the parser tolerates both. What it
//! never does is guess: a response that does not map cleanly onto the
//! contract is a classifier failure (fail closed).

use serde::Deserialize;

use super::types::{LegitimacyVerdict, RiskAssessment, RiskLevel};
use super::ClassifyError;

/// Parse a risk-classification response into a typed assessment.
pub fn parse_risk_response(raw: &str) -> Result<RiskAssessment, ClassifyError> {
    #[derive(Deserialize)]
    struct RawRisk {
        risk: String,
        explanation: String,
    }

    let json = extract_json_payload(raw);
    let parsed: RawRisk = serde_json::from_str(json)
        .map_err(|e| malformed(&format!("risk response is not the expected JSON: {e}")))?;

    let risk = parse_risk_level(&parsed.risk)
        .ok_or_else(|| malformed(&format!("unknown risk label {:?}", parsed.risk)))?;

    Ok(RiskAssessment {
        risk,
        explanation: parsed.explanation,
    })
}

/// Parse a legitimacy-gate response.
pub fn parse_legitimacy_response(raw: &str) -> Result<LegitimacyVerdict, ClassifyError> {
    #[derive(Deserialize)]
    struct RawVerdict {
        is_legal: bool,
        reason: Option<String>,
    }

    let json = extract_json_payload(raw);
    let parsed: RawVerdict = serde_json::from_str(json)
        .map_err(|e| malformed(&format!("legitimacy response is not the expected JSON: {e}")))?;

    Ok(LegitimacyVerdict {
        is_legal: parsed.is_legal,
        reason: parsed.reason.filter(|r| !r.trim().is_empty()),
    })
}

/// Map a label string onto the closed label set. Anything else is None.
fn parse_risk_level(label: &str) -> Option<RiskLevel> {
    match label.trim().to_lowercase().as_str() {
        "low" => Some(RiskLevel::Low),
        "medium" => Some(RiskLevel::Medium),
        "high" => Some(RiskLevel::High),
        _ => None,
    }
}

/// Strip an optional ```json fence, or cut from the first `{` to the last
/// `}` when the model padded the JSON with prose.
fn extract_json_payload(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(fence_start) = trimmed.find("```") {
        let after = &trimmed[fence_start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(fence_end) = after.find("```") {
            return after[..fence_end].trim();
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn malformed(detail: &str) -> ClassifyError {
    ClassifyError::Unavailable(detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_risk() {
        let assessment = parse_risk_response(
            r#"{"risk": "High", "explanation": "Unlimited liability with no cap."}"#,
        )
        .unwrap();
        assert_eq!(assessment.risk, RiskLevel::High);
        assert_eq!(assessment.explanation, "Unlimited liability with no cap.");
    }

    #[test]
    fn parses_fenced_json_risk() {
        let raw = "```json\n{\"risk\": \"Medium\", \"explanation\": \"Worth negotiating.\"}\n```";
        let assessment = parse_risk_response(raw).unwrap();
        assert_eq!(assessment.risk, RiskLevel::Medium);
    }

    #[test]
    fn parses_json_padded_with_prose() {
        let raw = "Here is my analysis: {\"risk\": \"Low\", \"explanation\": \"Standard clause.\"} Hope that helps!";
        let assessment = parse_risk_response(raw).unwrap();
        assert_eq!(assessment.risk, RiskLevel::Low);
    }

    #[test]
    fn risk_label_is_case_insensitive() {
        let raw = r#"{"risk": "hIgH", "explanation": "x"}"#;
        assert_eq!(parse_risk_response(raw).unwrap().risk, RiskLevel::High);
    }

    #[test]
    fn unknown_risk_label_fails_closed() {
        let raw = r#"{"risk": "Critical", "explanation": "made-up label"}"#;
        let err = parse_risk_response(raw).unwrap_err();
        assert!(matches!(err, ClassifyError::Unavailable(_)));
    }

    #[test]
    fn missing_explanation_fails_closed() {
        let raw = r#"{"risk": "High"}"#;
        assert!(parse_risk_response(raw).is_err());
    }

    #[test]
    fn non_json_fails_closed() {
        assert!(parse_risk_response("the clause looks risky to me").is_err());
        assert!(parse_risk_response("").is_err());
    }

    #[test]
    fn parses_legitimacy_accept() {
        let verdict =
            parse_legitimacy_response(r#"{"is_legal": true, "reason": "Service agreement."}"#)
                .unwrap();
        assert!(verdict.is_legal);
        assert_eq!(verdict.reason.as_deref(), Some("Service agreement."));
    }

    #[test]
    fn parses_legitimacy_reject_without_reason() {
        let verdict = parse_legitimacy_response(r#"{"is_legal": false}"#).unwrap();
        assert!(!verdict.is_legal);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn blank_legitimacy_reason_dropped() {
        let verdict =
            parse_legitimacy_response(r#"{"is_legal": false, "reason": "   "}"#).unwrap();
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn malformed_legitimacy_fails_closed() {
        assert!(parse_legitimacy_response(r#"{"is_legal": "maybe"}"#).is_err());
        assert!(parse_legitimacy_response("yes").is_err());
    }
}
