//! Response Sanitizer: best-effort structured extraction from generator output.
//!
//! The generator is asked for JSON but never trusted to deliver it cleanly:
//! code fences and chatter are stripped, the outermost `{ ... }` is parsed,
//! the score is coerced and clamped, and empty lists get fixed placeholders.

use serde_json::{Map, Value};

use crate::evaluation::errors::EvaluationError;
use crate::evaluation::models::{AssessmentResult, EvaluationMode};

pub const SEMANTIC_WEIGHT: f64 = 0.7;
pub const LLM_WEIGHT: f64 = 0.3;

pub const MISSING_KEYWORDS_PLACEHOLDER: &str = "No significant missing keywords identified";
pub const STRENGTHS_PLACEHOLDER: &str = "Resume contains relevant content for the role";
pub const WEAKNESSES_PLACEHOLDER: &str = "Consider adding more specific achievements and metrics";

/// A sanitized generator payload, before the orchestrator assigns a mode.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedAssessment {
    pub match_score: u8,
    pub missing_keywords: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl SanitizedAssessment {
    /// Vision mode: the LLM score stands alone.
    pub fn into_vision_result(self) -> AssessmentResult {
        AssessmentResult {
            match_score: self.match_score,
            semantic_score: None,
            missing_keywords: self.missing_keywords,
            strengths: self.strengths,
            weaknesses: self.weaknesses,
            mode: EvaluationMode::Vision,
        }
    }

    /// Text mode: the delivered score is the semantic/LLM blend.
    pub fn into_blended_result(self, semantic_score: u8) -> AssessmentResult {
        AssessmentResult {
            match_score: blend_scores(semantic_score, self.match_score),
            semantic_score: Some(semantic_score),
            missing_keywords: self.missing_keywords,
            strengths: self.strengths,
            weaknesses: self.weaknesses,
            mode: EvaluationMode::TextSemantic,
        }
    }
}

/// `round(0.7 * semantic + 0.3 * llm)`, clamped to [0, 100].
pub fn blend_scores(semantic_score: u8, llm_score: u8) -> u8 {
    let blended =
        SEMANTIC_WEIGHT * f64::from(semantic_score) + LLM_WEIGHT * f64::from(llm_score);
    blended.round().clamp(0.0, 100.0) as u8
}

pub fn sanitize(raw: &str) -> Result<SanitizedAssessment, EvaluationError> {
    let object = extract_json_object(raw)?;

    Ok(SanitizedAssessment {
        match_score: coerce_score(object.get("match_score")),
        missing_keywords: string_list(object.get("missing_keywords"), MISSING_KEYWORDS_PLACEHOLDER),
        strengths: string_list(object.get("strengths"), STRENGTHS_PLACEHOLDER),
        weaknesses: string_list(object.get("weaknesses"), WEAKNESSES_PLACEHOLDER),
    })
}

fn extract_json_object(raw: &str) -> Result<Map<String, Value>, EvaluationError> {
    let cleaned = raw.replace("```json", "").replace("```", "");

    let (start, end) = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(EvaluationError::MalformedResponse(
                "No valid JSON object found in AI response".to_string(),
            ))
        }
    };

    match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(EvaluationError::MalformedResponse(
            "AI response is not a JSON object".to_string(),
        )),
        Err(e) => Err(EvaluationError::MalformedResponse(e.to_string())),
    }
}

/// Integers pass through, floats truncate, strings parse their leading
/// signed digits (`"85%"` → 85). Anything else is 0. Always clamped.
fn coerce_score(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => leading_integer(s).unwrap_or(0),
        _ => 0,
    };
    raw.clamp(0, 100) as u8
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long digit runs; the clamp brings them back to 100.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}

fn string_list(value: Option<&Value>, placeholder: &str) -> Vec<String> {
    let items: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(list_entry).collect(),
        Some(single @ Value::String(_)) => list_entry(single).into_iter().collect(),
        _ => Vec::new(),
    };

    if items.is_empty() {
        vec![placeholder.to_string()]
    } else {
        items
    }
}

fn list_entry(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "match_score": 72,
        "missing_keywords": ["PostgreSQL"],
        "strengths": ["Go services in production"],
        "weaknesses": ["No relational design examples"]
    }"#;

    #[test]
    fn test_well_formed_payload() {
        let result = sanitize(WELL_FORMED).unwrap();
        assert_eq!(result.match_score, 72);
        assert_eq!(result.missing_keywords, vec!["PostgreSQL"]);
        assert_eq!(result.strengths, vec!["Go services in production"]);
        assert_eq!(result.weaknesses, vec!["No relational design examples"]);
    }

    #[test]
    fn test_code_fences_and_chatter_are_stripped() {
        let raw = format!("Sure! Here is the evaluation:\n```json\n{WELL_FORMED}\n```\nGood luck!");
        assert_eq!(sanitize(&raw).unwrap(), sanitize(WELL_FORMED).unwrap());
    }

    #[test]
    fn test_no_braces_is_malformed() {
        let err = sanitize("I cannot evaluate this resume.").unwrap_err();
        assert!(matches!(err, EvaluationError::MalformedResponse(_)));
    }

    #[test]
    fn test_inverted_braces_are_malformed() {
        assert!(matches!(
            sanitize("} nothing here {"),
            Err(EvaluationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_invalid_json_between_braces_is_malformed() {
        assert!(matches!(
            sanitize("{match_score: eighty}"),
            Err(EvaluationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(sanitize(r#"{"match_score": 150}"#).unwrap().match_score, 100);
        assert_eq!(sanitize(r#"{"match_score": -20}"#).unwrap().match_score, 0);
    }

    #[test]
    fn test_score_coercion() {
        assert_eq!(sanitize(r#"{"match_score": "85%"}"#).unwrap().match_score, 85);
        assert_eq!(sanitize(r#"{"match_score": " 42 "}"#).unwrap().match_score, 42);
        assert_eq!(sanitize(r#"{"match_score": 67.9}"#).unwrap().match_score, 67);
        assert_eq!(sanitize(r#"{"match_score": "high"}"#).unwrap().match_score, 0);
        assert_eq!(sanitize(r#"{"match_score": null}"#).unwrap().match_score, 0);
        assert_eq!(sanitize(r#"{"strengths": ["x"]}"#).unwrap().match_score, 0);
        assert_eq!(
            sanitize(r#"{"match_score": "99999999999999999999999"}"#)
                .unwrap()
                .match_score,
            100
        );
    }

    #[test]
    fn test_missing_and_empty_lists_get_exactly_one_placeholder() {
        let result = sanitize(r#"{"match_score": 50, "missing_keywords": [], "strengths": ["  "]}"#)
            .unwrap();
        assert_eq!(result.missing_keywords, vec![MISSING_KEYWORDS_PLACEHOLDER]);
        assert_eq!(result.strengths, vec![STRENGTHS_PLACEHOLDER]);
        assert_eq!(result.weaknesses, vec![WEAKNESSES_PLACEHOLDER]);
    }

    #[test]
    fn test_non_string_entries_are_stringified_or_dropped() {
        let result =
            sanitize(r#"{"missing_keywords": ["Kafka", 5, null, {"k": "v"}], "strengths": "Go"}"#)
                .unwrap();
        assert_eq!(result.missing_keywords, vec!["Kafka", "5"]);
        assert_eq!(result.strengths, vec!["Go"]);
    }

    #[test]
    fn test_blend_weights() {
        assert_eq!(blend_scores(80, 50), 71);
        assert_eq!(blend_scores(100, 100), 100);
        assert_eq!(blend_scores(0, 0), 0);
        assert_eq!(blend_scores(90, 40), 75);
        assert_eq!(blend_scores(0, 100), 30);
    }

    #[test]
    fn test_blended_result_keeps_semantic_score() {
        let result = sanitize(r#"{"match_score": 50}"#)
            .unwrap()
            .into_blended_result(80);
        assert_eq!(result.match_score, 71);
        assert_eq!(result.semantic_score, Some(80));
        assert_eq!(result.mode, EvaluationMode::TextSemantic);
    }

    #[test]
    fn test_vision_result_has_no_semantic_score() {
        let result = sanitize(WELL_FORMED).unwrap().into_vision_result();
        assert_eq!(result.match_score, 72);
        assert_eq!(result.semantic_score, None);
        assert_eq!(result.mode, EvaluationMode::Vision);
    }

    #[test]
    fn test_resanitizing_a_delivered_result_is_stable() {
        let first = sanitize(r#"{"match_score": "130", "strengths": []}"#)
            .unwrap()
            .into_vision_result();
        let serialized = serde_json::to_string(&first).unwrap();
        let second = sanitize(&serialized).unwrap().into_vision_result();
        assert_eq!(first, second);
        assert_eq!(second.strengths, vec![STRENGTHS_PLACEHOLDER]);
    }
}
