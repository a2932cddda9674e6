//! Judge reply parsing.
//!
//! Judges often wrap their JSON in prose or code fences. Parsing first tries
//! the whole text, then the outermost `{...}` span.

use serde_json::Value;
use thiserror::Error;

/// Reason used when the judge did not provide one.
pub const NO_REASON: &str = "no reason provided";

/// A reply the judge could not be understood from.
///
/// The display strings are the reasons surfaced in verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    /// No JSON object anywhere in the reply.
    #[error("empty judge response")]
    Empty,
    /// A JSON-looking span that does not parse, or lacks a `match` flag.
    #[error("invalid judge response")]
    Invalid,
}

/// A well-formed judge answer.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeReply {
    pub is_match: bool,
    /// Judge's confidence in `[0, 1]`, as stated (not zeroed for non-matches).
    pub confidence: f32,
    pub reason: String,
}

impl JudgeReply {
    /// Confidence that the pair matches: the stated confidence for a match,
    /// zero otherwise.
    pub fn match_confidence(&self) -> f32 {
        if self.is_match {
            self.confidence
        } else {
            0.0
        }
    }
}

/// Parse a judge's raw text into a [`JudgeReply`].
pub fn parse_judge_reply(text: &str) -> Result<JudgeReply, ReplyError> {
    let value = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) if value.is_object() => value,
        _ => extract_object(text)?,
    };
    reply_from_value(&value)
}

/// Parse the outermost `{...}` span of `text`.
fn extract_object(text: &str) -> Result<Value, ReplyError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(ReplyError::Empty);
    };
    if end <= start {
        return Err(ReplyError::Empty);
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value) if value.is_object() => Ok(value),
        _ => Err(ReplyError::Invalid),
    }
}

fn reply_from_value(value: &Value) -> Result<JudgeReply, ReplyError> {
    let is_match = value
        .get("match")
        .and_then(as_flag)
        .ok_or(ReplyError::Invalid)?;
    let confidence = value
        .get("confidence")
        .and_then(as_number)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(NO_REASON)
        .to_string();

    Ok(JudgeReply {
        is_match,
        confidence,
        reason,
    })
}

/// Booleans, plus the string spellings small models tend to emit.
fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f32> {
    let number: Option<f32> = match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict_json() {
        let reply =
            parse_judge_reply(r#"{"reason": "same event", "match": true, "confidence": 0.93}"#)
                .unwrap();
        assert!(reply.is_match);
        assert!((reply.confidence - 0.93).abs() < 1e-6);
        assert_eq!(reply.reason, "same event");
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let text = "Sure! Here is my answer:\n```json\n{\"match\": false, \"confidence\": 0.8, \"reason\": \"different years\"}\n```\nHope that helps.";
        let reply = parse_judge_reply(text).unwrap();
        assert!(!reply.is_match);
        assert_eq!(reply.match_confidence(), 0.0);
        assert_eq!(reply.reason, "different years");
    }

    #[test]
    fn test_parse_empty_reply() {
        assert_eq!(parse_judge_reply(""), Err(ReplyError::Empty));
        assert_eq!(parse_judge_reply("I cannot decide."), Err(ReplyError::Empty));
        assert_eq!(ReplyError::Empty.to_string(), "empty judge response");
    }

    #[test]
    fn test_parse_garbled_reply() {
        assert_eq!(
            parse_judge_reply("{match: yes, confidence: high}"),
            Err(ReplyError::Invalid)
        );
        assert_eq!(ReplyError::Invalid.to_string(), "invalid judge response");
    }

    #[test]
    fn test_parse_requires_match_flag() {
        assert_eq!(
            parse_judge_reply(r#"{"confidence": 0.9, "reason": "looks similar"}"#),
            Err(ReplyError::Invalid)
        );
    }

    #[test]
    fn test_parse_lenient_field_types() {
        let reply =
            parse_judge_reply(r#"{"match": "true", "confidence": "0.75"}"#).unwrap();
        assert!(reply.is_match);
        assert!((reply.confidence - 0.75).abs() < 1e-6);
        assert_eq!(reply.reason, NO_REASON);
    }

    #[test]
    fn test_parse_clamps_confidence() {
        let reply = parse_judge_reply(r#"{"match": true, "confidence": 7}"#).unwrap();
        assert_eq!(reply.confidence, 1.0);
        let reply = parse_judge_reply(r#"{"match": true, "confidence": -1}"#).unwrap();
        assert_eq!(reply.confidence, 0.0);
    }

    #[test]
    fn test_parse_array_is_not_a_reply() {
        assert_eq!(parse_judge_reply("[1, 2, 3]"), Err(ReplyError::Empty));
    }
}
