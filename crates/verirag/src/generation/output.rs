//! Structured output handling for the four-field answer schema

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::types::VerifiedAnswer;

/// Gemini `responseSchema` for [`VerifiedAnswer`]
pub fn answer_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "answer": { "type": "STRING" },
            "faithfulness_score": { "type": "NUMBER" },
            "explanation": { "type": "STRING" },
            "source_citation": { "type": "STRING" }
        },
        "required": ["answer", "faithfulness_score", "explanation", "source_citation"],
        "propertyOrdering": ["answer", "faithfulness_score", "explanation", "source_citation"]
    })
}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\s*```\s*$")
            .expect("Invalid regex")
    })
}

/// Remove a markdown code fence wrapping the whole response, if any
pub fn strip_code_fences(raw: &str) -> &str {
    match fence_pattern().captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

#[derive(Deserialize)]
struct RawAnswer {
    answer: String,
    faithfulness_score: f64,
    explanation: String,
    source_citation: String,
}

/// Decode model output into a [`VerifiedAnswer`]
///
/// All four fields are required with their exact types, and the score must be
/// a finite number in `[0, 1]`.
pub fn parse_verified_answer(raw: &str) -> Result<VerifiedAnswer> {
    let body = strip_code_fences(raw);
    let parsed: RawAnswer = serde_json::from_str(body)
        .map_err(|e| Error::parse(format!("Model output is not a valid answer object: {}", e)))?;

    let score = parsed.faithfulness_score;
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(Error::parse(format!(
            "faithfulness_score must be within [0, 1], got {}",
            score
        )));
    }

    Ok(VerifiedAnswer {
        answer: parsed.answer,
        faithfulness_score: score as f32,
        explanation: parsed.explanation,
        source_citation: parsed.source_citation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"answer":"Blue.","faithfulness_score":1.0,"explanation":"Stated directly.","source_citation":"The sky is blue."}"#;

    #[test]
    fn test_parse_plain_json() {
        let answer = parse_verified_answer(VALID).unwrap();
        assert_eq!(answer.answer, "Blue.");
        assert_eq!(answer.faithfulness_score, 1.0);
        assert_eq!(answer.source_citation, "The sky is blue.");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("{\"a\":\"```\"}"), "{\"a\":\"```\"}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert_eq!(parse_verified_answer(&fenced).unwrap(), parse_verified_answer(VALID).unwrap());
    }

    #[test]
    fn test_rejects_missing_field() {
        let err = parse_verified_answer(r#"{"answer":"x","faithfulness_score":0.5,"explanation":"y"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("source_citation"));
    }

    #[test]
    fn test_rejects_wrong_types() {
        let err = parse_verified_answer(
            r#"{"answer":"x","faithfulness_score":"high","explanation":"y","source_citation":"z"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_rejects_out_of_range_score() {
        for score in ["1.5", "-0.1"] {
            let raw = format!(
                r#"{{"answer":"x","faithfulness_score":{},"explanation":"y","source_citation":"z"}}"#,
                score
            );
            assert!(matches!(parse_verified_answer(&raw), Err(Error::Parse(_))));
        }
    }

    #[test]
    fn test_rejects_prose() {
        assert!(matches!(
            parse_verified_answer("I think the sky is blue."),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let schema = answer_response_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
        assert_eq!(schema["properties"]["faithfulness_score"]["type"], "NUMBER");
    }
}
