//! Judge verdict parsing
//!
//! The judge is asked for `{"useful": <bool>, "confidence": <0..1>}`. Anything
//! that does not parse as such an object falls back to a lexical heuristic
//! whose confidence is always undefined.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Affirmative markers scanned for by the heuristic (French and English)
const POSITIVE_INDICATORS: &[&str] = &[
    "oui",
    "yes",
    "y",
    "valid",
    "correct",
    "pertinent",
    "utile",
    "useful",
    "helpful",
    "relevant",
    "peut aider",
    "can help",
    "contient",
    "contains",
    "apporte",
    "provides",
    "positive",
];

/// Bare negative answers
const NEGATIVE_TOKENS: &[&str] = &["non", "no"];

/// The judge's decision for one chunk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub useful: bool,
    /// In [0, 1]; `None` when the response was not structured
    pub confidence: Option<f32>,
}

impl Verdict {
    pub fn new(useful: bool, confidence: Option<f32>) -> Self {
        Self {
            useful,
            confidence: confidence.filter(|c| !c.is_nan()).map(|c| c.clamp(0.0, 1.0)),
        }
    }

    /// Accepted iff useful and the confidence, when known, reaches the threshold
    pub fn is_accepted(&self, threshold: f32) -> bool {
        self.useful && self.confidence.is_none_or(|c| c >= threshold)
    }
}

/// Parse a raw judge response, falling back to [`classify`]
pub fn parse_verdict(response: &str) -> Verdict {
    match parse_structured(response) {
        Ok(verdict) => verdict,
        Err(_) => classify(response),
    }
}

/// Strict structured parse; tolerates prose or a Markdown fence around the
/// JSON object
pub fn parse_structured(response: &str) -> Result<Verdict, DomainError> {
    let trimmed = response.trim();

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => verdict_from_value(&value),
        Err(strict_error) => {
            let span = extract_json(trimmed).ok_or_else(|| {
                DomainError::judge_parse(format!("Response is not JSON: {}", strict_error))
            })?;

            let value = serde_json::from_str::<Value>(span)
                .map_err(|e| DomainError::judge_parse(format!("Embedded JSON invalid: {}", e)))?;

            verdict_from_value(&value)
        }
    }
}

/// Lexical fallback: bare negative → not useful, else useful iff any
/// affirmative marker occurs. Confidence is always undefined.
pub fn classify(response: &str) -> Verdict {
    let normalized = response.trim().to_lowercase();

    if NEGATIVE_TOKENS.contains(&normalized.as_str()) {
        return Verdict::new(false, None);
    }

    let useful = POSITIVE_INDICATORS
        .iter()
        .any(|marker| normalized.contains(marker));

    Verdict::new(useful, None)
}

fn verdict_from_value(value: &Value) -> Result<Verdict, DomainError> {
    let object = value
        .as_object()
        .ok_or_else(|| DomainError::judge_parse("Verdict is not a JSON object"))?;

    let useful = match object.get("useful") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(other) => {
            return Err(DomainError::judge_parse(format!(
                "Unexpected type for 'useful': {}",
                other
            )));
        }
    };

    let confidence = match object.get("confidence") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64().map(|f| f as f32),
        Some(Value::String(s)) => Some(
            s.trim()
                .parse::<f32>()
                .ok()
                .filter(|c| c.is_finite())
                .ok_or_else(|| {
                    DomainError::judge_parse(format!("Confidence is not a finite number: {}", s))
                })?,
        ),
        Some(other) => {
            return Err(DomainError::judge_parse(format!(
                "Unexpected type for 'confidence': {}",
                other
            )));
        }
    };

    Ok(Verdict::new(useful, confidence))
}

/// Extract a JSON object from a string (handles markdown code blocks)
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;

    (start < end).then(|| &text[start..=end])
}
