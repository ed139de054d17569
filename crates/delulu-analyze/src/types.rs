//! Result types returned to callers.
//!
//! Field names on the wire match what earlier clients already read
//! (`delulu_score`, `delulu_description`, `relationship_probability`).

use serde::{Deserialize, Serialize};

use crate::labels::Score;

/// Advice used when none could be recovered.
pub const FILLER_ADVICE: &str = "Keep manifesting, bestie!";

/// Synopsis used when the per-item summarizer fails.
pub const FILLER_SYNOPSIS: &str = "Analysis unavailable";

/// Narrative part of an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Text(String),
    Structured {
        narrative: String,
        insights: Vec<String>,
    },
}

impl Summary {
    pub fn narrative(&self) -> &str {
        match self {
            Summary::Text(t) => t,
            Summary::Structured { narrative, .. } => narrative,
        }
    }

    /// Replace the narrative, keeping any insights.
    pub fn with_narrative(&self, narrative: String) -> Summary {
        match self {
            Summary::Text(_) => Summary::Text(narrative),
            Summary::Structured { insights, .. } => Summary::Structured {
                narrative,
                insights: insights.clone(),
            },
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Summary::Text(String::new())
    }
}

/// Actionable advice: one sentence or an ordered list of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Advice {
    Text(String),
    Steps(Vec<String>),
}

impl Advice {
    pub fn is_empty(&self) -> bool {
        match self {
            Advice::Text(t) => t.trim().is_empty(),
            Advice::Steps(steps) => steps.iter().all(|s| s.trim().is_empty()),
        }
    }
}

impl Default for Advice {
    fn default() -> Self {
        Advice::Text(FILLER_ADVICE.to_string())
    }
}

/// A normalized assessment. Only the normalizer constructs one, so the label
/// always matches the score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(rename = "delulu_score")]
    pub(crate) score: Score,
    #[serde(rename = "delulu_description")]
    pub(crate) score_label: &'static str,
    pub(crate) summary: Summary,
    #[serde(rename = "relationship_probability")]
    pub(crate) probability: u8,
    pub(crate) advice: Advice,
}

impl AnalysisResult {
    pub fn score(&self) -> Score {
        self.score
    }

    pub fn score_label(&self) -> &'static str {
        self.score_label
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn probability(&self) -> u8 {
        self.probability
    }

    pub fn advice(&self) -> &Advice {
        &self.advice
    }
}

/// Correlates an output item with its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Url(String),
    Index(usize),
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Url(url) => write!(f, "{}", url),
            Identity::Index(i) => write!(f, "#{}", i),
        }
    }
}

/// One per-input slot of a batch response.
///
/// A failed item carries `error` and nulls for every analytical field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    identity: Identity,
    delulu_score: Option<Score>,
    delulu_description: Option<&'static str>,
    summary: Option<Summary>,
    relationship_probability: Option<u8>,
    advice: Option<Advice>,
    error: Option<String>,
}

impl BatchItem {
    pub(crate) fn succeeded(identity: Identity, result: &AnalysisResult, summary: Summary) -> Self {
        Self {
            identity,
            delulu_score: Some(result.score),
            delulu_description: Some(result.score_label),
            summary: Some(summary),
            relationship_probability: Some(result.probability),
            advice: Some(result.advice.clone()),
            error: None,
        }
    }

    pub(crate) fn failed(identity: Identity, error: impl Into<String>) -> Self {
        Self {
            identity,
            delulu_score: None,
            delulu_description: None,
            summary: None,
            relationship_probability: None,
            advice: None,
            error: Some(error.into()),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn score(&self) -> Option<Score> {
        self.delulu_score
    }

    pub fn score_label(&self) -> Option<&'static str> {
        self.delulu_description
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn probability(&self) -> Option<u8> {
        self.relationship_probability
    }

    pub fn advice(&self) -> Option<&Advice> {
        self.advice.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate batch response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    items: Vec<BatchItem>,
    total_submitted: usize,
    successful_count: usize,
}

impl BatchResult {
    /// Counters are derived from the items, one item per submitted input.
    pub(crate) fn from_items(items: Vec<BatchItem>) -> Self {
        let successful_count = items.iter().filter(|i| i.is_success()).count();
        Self {
            total_submitted: items.len(),
            successful_count,
            items,
        }
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn total_submitted(&self) -> usize {
        self.total_submitted
    }

    pub fn successful_count(&self) -> usize {
        self.successful_count
    }
}
