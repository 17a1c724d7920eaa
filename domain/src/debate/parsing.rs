//! Tolerant parsing of reviewer output.
//!
//! The reviewer is asked for JSON but may wrap it in a markdown fence, return
//! a lone object where an array was requested, omit fields, or answer in
//! prose. Parsing never fails: a malformed reply becomes a degraded record
//! that still carries the raw text.
//!
//! | Function | Expects | Fallback |
//! |----------|---------|----------|
//! | [`parse_challenges`] | JSON array of challenge objects | one `medium` challenge holding the raw text |
//! | [`parse_verdict`] | JSON object | `action_required` with the raw text |
//!
//! The `try_` variants expose the underlying error so callers can log it.

use super::entities::{Challenge, Resolution, Severity, Verdict};
use serde_json::{Map, Value};
use thiserror::Error;

/// Evidence note attached to the fallback challenge
pub const UNPARSED_CHALLENGE_EVIDENCE: &str = "Unable to parse structured challenges";

/// Why a reviewer reply could not be read as structured JSON
#[derive(Error, Debug)]
pub enum ReviewParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Remove a surrounding markdown code fence.
///
/// When the trimmed text starts with ```` ``` ````, the first line (which may
/// carry a language tag) is dropped, and the last line is dropped too if it is
/// a closing fence.
pub fn strip_code_fence(content: &str) -> String {
    let text = content.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let closes = lines.len() > 1 && lines.last().is_some_and(|l| l.trim() == "```");
    let end = if closes { lines.len() - 1 } else { lines.len() };
    lines[1..end].join("\n")
}

/// Parse challenges, falling back to a single degraded challenge
pub fn parse_challenges(content: &str) -> Vec<Challenge> {
    try_parse_challenges(content).unwrap_or_else(|_| vec![fallback_challenge(content)])
}

/// Strict variant of [`parse_challenges`]
pub fn try_parse_challenges(content: &str) -> Result<Vec<Challenge>, ReviewParseError> {
    let value: Value = serde_json::from_str(&strip_code_fence(content))?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(challenge_from_map(&map)),
            other => Err(ReviewParseError::NotAnObject(kind_of(&other))),
        })
        .collect()
}

/// The record used when challenge output is unreadable
pub fn fallback_challenge(content: &str) -> Challenge {
    Challenge {
        challenge_text: content.to_string(),
        severity: Severity::Medium,
        targeted_agents: Vec::new(),
        evidence_needed: UNPARSED_CHALLENGE_EVIDENCE.to_string(),
    }
}

/// Parse a verdict, falling back to `action_required` with the raw text
pub fn parse_verdict(content: &str) -> Verdict {
    try_parse_verdict(content).unwrap_or_else(|_| fallback_verdict(content))
}

/// Strict variant of [`parse_verdict`]
pub fn try_parse_verdict(content: &str) -> Result<Verdict, ReviewParseError> {
    let value: Value = serde_json::from_str(&strip_code_fence(content))?;
    let map = match value {
        Value::Object(map) => map,
        other => return Err(ReviewParseError::NotAnObject(kind_of(&other))),
    };

    Ok(Verdict {
        resolution: string_field(&map, "resolution")
            .map(Resolution::from_model)
            .unwrap_or_default(),
        resolution_text: string_field(&map, "resolution_text")
            .unwrap_or_default()
            .to_string(),
    })
}

/// The record used when verdict output is unreadable
pub fn fallback_verdict(content: &str) -> Verdict {
    Verdict {
        resolution: Resolution::ActionRequired,
        resolution_text: content.to_string(),
    }
}

fn challenge_from_map(map: &Map<String, Value>) -> Challenge {
    let targeted_agents = match map.get("targeted_agents") {
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect(),
        Some(Value::String(name)) if !name.trim().is_empty() => vec![name.trim().to_lowercase()],
        _ => Vec::new(),
    };

    Challenge {
        challenge_text: string_field(map, "challenge_text")
            .unwrap_or_default()
            .to_string(),
        severity: string_field(map, "severity")
            .map(Severity::from_model)
            .unwrap_or_default(),
        targeted_agents,
        evidence_needed: string_field(map, "evidence_needed")
            .unwrap_or_default()
            .to_string(),
    }
}

fn string_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
