//! Field-level coercion shared by the parse strategies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\blevel\s*[:#-]?\s*(\d{1,3})").unwrap());
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,3})%").unwrap());
static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").unwrap());
static EMPHASIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|__|\*|`").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s*").unwrap());

/// First integer following the token "Level", case-insensitive.
pub fn find_score(text: &str) -> Option<i64> {
    LEVEL_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// First 1–3 digit integer immediately followed by `%`.
pub fn find_probability(text: &str) -> Option<i64> {
    PERCENT_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn first_integer(text: &str) -> Option<i64> {
    INTEGER_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Score from a JSON value: a number, or a string such as `"3"` or `"Level 3"`.
pub fn score_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => find_score(s).or_else(|| first_integer(s)),
        _ => None,
    }
}

/// Probability from a JSON value. Fractions strictly between 0 and 1 are
/// read as proportions.
pub fn probability_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n.as_f64().map(|f| {
                if f > 0.0 && f < 1.0 {
                    (f * 100.0).round() as i64
                } else {
                    f.round() as i64
                }
            }),
        },
        Value::String(s) => find_probability(s).or_else(|| first_integer(s)),
        _ => None,
    }
}

/// Remove markdown emphasis and heading markers, drop blank lines, and join
/// what remains with single spaces.
pub fn clean_block(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = EMPHASIS_RE.replace_all(line.trim(), "");
            HEADING_RE.replace(line.trim(), "").trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Non-empty cleaned text, or `None`.
pub fn non_empty(text: &str) -> Option<String> {
    let cleaned = clean_block(text);
    (!cleaned.is_empty()).then_some(cleaned)
}
