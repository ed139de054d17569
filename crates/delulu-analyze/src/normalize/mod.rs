//! Response normalization: raw assessment output into an [`AnalysisResult`].
//!
//! Parse strategies are tried in a fixed order and the first that recovers
//! a score or a probability wins. Whatever the winning strategy leaves
//! missing is defaulted or rejected according to [`FieldPolicies`].

pub mod coerce;
pub mod json;
pub mod prose;

use delulu_core::{Error, Result};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

use crate::labels::{Score, ScoreLabels, DELULU_LABELS};
use crate::types::{Advice, AnalysisResult, Summary, FILLER_SYNOPSIS};

/// Fields recovered by a parse strategy, before clamping and defaulting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub score: Option<i64>,
    pub probability: Option<i64>,
    pub summary: Option<Summary>,
    pub advice: Option<Advice>,
    /// Label text echoed by the model; never trusted, only logged.
    pub label: Option<String>,
}

impl RawFields {
    /// A strategy only counts as a match when it found a score or a probability.
    pub fn has_anchor(&self) -> bool {
        self.score.is_some() || self.probability.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ParseFailure {
    #[error("empty input")]
    Empty,
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("JSON is not an object")]
    NotAnObject,
    #[error("no code fence")]
    NoFence,
    #[error("no numbered sections")]
    NoSections,
    #[error("neither a score nor a probability was found")]
    NoAnchorFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Json,
    FencedJson,
    NumberedSections,
    LineScan,
}

impl Strategy {
    pub const CHAIN: [Strategy; 4] = [
        Strategy::Json,
        Strategy::FencedJson,
        Strategy::NumberedSections,
        Strategy::LineScan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Json => "json",
            Strategy::FencedJson => "fenced_json",
            Strategy::NumberedSections => "numbered_sections",
            Strategy::LineScan => "line_scan",
        }
    }

    pub fn parse(self, text: &str) -> std::result::Result<RawFields, ParseFailure> {
        match self {
            Strategy::Json => json::parse_json(text),
            Strategy::FencedJson => json::parse_fenced_json(text),
            Strategy::NumberedSections => prose::parse_sections(text),
            Strategy::LineScan => prose::parse_lines(text),
        }
    }
}

/// What happens when a field is missing after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldPolicy {
    /// Substitute the documented default.
    #[default]
    Defaultable,
    /// Treat the whole response as unparseable.
    MustRecover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldPolicies {
    pub score: FieldPolicy,
    pub summary: FieldPolicy,
    pub probability: FieldPolicy,
    pub advice: FieldPolicy,
}

impl FieldPolicies {
    pub fn strict() -> Self {
        Self {
            score: FieldPolicy::MustRecover,
            summary: FieldPolicy::MustRecover,
            probability: FieldPolicy::MustRecover,
            advice: FieldPolicy::MustRecover,
        }
    }
}

pub struct Normalizer {
    labels: &'static ScoreLabels,
    policies: FieldPolicies,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&DELULU_LABELS)
    }
}

impl Normalizer {
    pub fn new(labels: &'static ScoreLabels) -> Self {
        Self {
            labels,
            policies: FieldPolicies::default(),
        }
    }

    pub fn with_policies(mut self, policies: FieldPolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn labels(&self) -> &'static ScoreLabels {
        self.labels
    }

    /// Run the strategy chain; the first strategy that yields an anchor wins.
    pub fn parse(&self, blob: &str) -> Result<(Strategy, RawFields)> {
        let mut failures = Vec::new();
        for strategy in Strategy::CHAIN {
            match strategy.parse(blob) {
                Ok(fields) => {
                    debug!(strategy = strategy.name(), "Parsed assessment output");
                    return Ok((strategy, fields));
                }
                Err(e) => failures.push(format!("{}: {}", strategy.name(), e)),
            }
        }
        warn!(failures = ?failures, "No parse strategy matched assessment output");
        Err(Error::Unparseable(failures.join("; ")))
    }

    /// Parse, clamp, and default `blob` into a complete result.
    pub fn normalize(&self, blob: &str) -> Result<AnalysisResult> {
        let (_, fields) = self.parse(blob)?;
        self.finish(fields)
    }

    /// Apply clamping, the label table, and field policies.
    pub fn finish(&self, fields: RawFields) -> Result<AnalysisResult> {
        let RawFields {
            score,
            probability,
            summary,
            advice,
            label,
        } = fields;
        let advice = advice.filter(|a| !a.is_empty());

        let missing: Vec<&str> = [
            ("score", score.is_none(), self.policies.score),
            ("summary", summary.is_none(), self.policies.summary),
            ("probability", probability.is_none(), self.policies.probability),
            ("advice", advice.is_none(), self.policies.advice),
        ]
        .into_iter()
        .filter(|(_, absent, policy)| *absent && *policy == FieldPolicy::MustRecover)
        .map(|(name, _, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(Error::Unparseable(format!(
                "required fields missing: {}",
                missing.join(", ")
            )));
        }

        let score = Score::clamped(score.unwrap_or(1));
        let score_label = self.labels.label(score);
        if let Some(echoed) = label.as_deref() {
            if !self.labels.contains(echoed) {
                debug!(echoed, expected = score_label, "Ignoring label from model output");
            }
        }

        Ok(AnalysisResult {
            score,
            score_label,
            summary: summary.unwrap_or_else(|| Summary::Text(FILLER_SYNOPSIS.to_string())),
            probability: probability.unwrap_or(0).clamp(0, 100) as u8,
            advice: advice.unwrap_or_default(),
        })
    }
}
