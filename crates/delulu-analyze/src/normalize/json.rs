//! JSON output parsing, with and without a code-fence wrapper.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::coerce::{non_empty, probability_from_value, score_from_value};
use super::{ParseFailure, RawFields};
use crate::types::{Advice, Summary};

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A\s*```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)\s*```\s*\z").unwrap());

const SCORE_KEYS: &[&str] = &["delulu_score", "score", "deluluScore"];
const LABEL_KEYS: &[&str] = &["delulu_description", "scoreLabel", "score_label", "deluluDescription"];
const SUMMARY_KEYS: &[&str] = &["summary", "whats_happening", "whatsHappening", "analysis"];
const PROBABILITY_KEYS: &[&str] = &[
    "relationship_probability",
    "probability",
    "relationshipProbability",
];
const ADVICE_KEYS: &[&str] = &["advice", "next_move", "nextMove"];

const NARRATIVE_KEYS: &[&str] = &["narrative", "summary", "text", "overview"];
const INSIGHT_KEYS: &[&str] = &["insights", "bullets", "key_insights", "points"];

/// Parse text that should be exactly one JSON object.
pub fn parse_json(text: &str) -> Result<RawFields, ParseFailure> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseFailure::Empty);
    }
    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
    let obj = value.as_object().ok_or(ParseFailure::NotAnObject)?;

    let fields = RawFields {
        score: field(obj, SCORE_KEYS).and_then(score_from_value),
        probability: field(obj, PROBABILITY_KEYS).and_then(probability_from_value),
        summary: field(obj, SUMMARY_KEYS).and_then(summary_from_value),
        advice: field(obj, ADVICE_KEYS).and_then(advice_from_value),
        label: field(obj, LABEL_KEYS)
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    if !fields.has_anchor() {
        return Err(ParseFailure::NoAnchorFields);
    }
    Ok(fields)
}

/// Strip a leading/trailing triple-backtick wrapper (optional language tag),
/// then parse the inside as JSON.
pub fn parse_fenced_json(text: &str) -> Result<RawFields, ParseFailure> {
    let inner = strip_code_fence(text).ok_or(ParseFailure::NoFence)?;
    parse_json(inner)
}

pub fn strip_code_fence(text: &str) -> Option<&str> {
    FENCE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// First present, non-null value among `keys`.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(non_empty)
            .collect(),
        Value::String(s) => non_empty(s).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn summary_from_value(value: &Value) -> Option<Summary> {
    match value {
        Value::String(s) => non_empty(s).map(Summary::Text),
        Value::Array(_) => {
            let parts = string_list(value);
            (!parts.is_empty()).then(|| Summary::Text(parts.join(" ")))
        }
        Value::Object(obj) => {
            let narrative = field(obj, NARRATIVE_KEYS)
                .and_then(Value::as_str)
                .and_then(non_empty);
            let insights = field(obj, INSIGHT_KEYS).map(string_list).unwrap_or_default();
            match (narrative, insights.is_empty()) {
                (None, true) => None,
                (Some(narrative), true) => Some(Summary::Text(narrative)),
                (narrative, false) => Some(Summary::Structured {
                    narrative: narrative.unwrap_or_else(|| insights.join(" ")),
                    insights,
                }),
            }
        }
        _ => None,
    }
}

fn advice_from_value(value: &Value) -> Option<Advice> {
    match value {
        Value::String(s) => non_empty(s).map(Advice::Text),
        Value::Array(_) => {
            let steps = string_list(value);
            (!steps.is_empty()).then_some(Advice::Steps(steps))
        }
        _ => None,
    }
}
