//! Analyzer configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output format the assessment collaborator is asked to produce.
///
/// The normalizer never relies on this; it tries both formats regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// A single JSON object.
    Json,
    /// Four numbered, labeled sections.
    #[default]
    Prose,
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputMode::Json),
            "prose" | "text" => Ok(OutputMode::Prose),
            other => Err(Error::Config(format!("unknown output mode: {}", other))),
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Prose => write!(f, "prose"),
        }
    }
}

/// Top-level analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// HTTP server port.
    pub port: u16,
    /// Minimum length of a single text submission.
    pub min_text_length: usize,
    /// Extracted image text shorter than this is rejected.
    pub min_extracted_length: usize,
    /// Synopses shorter than this are replaced with filler.
    pub min_synopsis_length: usize,
    /// Run the per-item summarizer in batch mode.
    pub per_item_summaries: bool,
    /// Output format requested from the assessment collaborator.
    pub output_mode: OutputMode,
    /// LLM provider configuration file.
    pub llm_config_file: PathBuf,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            min_text_length: 10,
            min_extracted_length: 10,
            min_synopsis_length: 10,
            per_item_summaries: false,
            output_mode: OutputMode::Prose,
            llm_config_file: PathBuf::from("llm-config.json"),
        }
    }
}

impl AnalyzerConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let min_text_length = parse_or(&lookup, "DELULU_MIN_TEXT_LENGTH", defaults.min_text_length)?;
        let min_extracted_length = parse_or(
            &lookup,
            "DELULU_MIN_EXTRACTED_LENGTH",
            defaults.min_extracted_length,
        )?;
        let min_synopsis_length = parse_or(
            &lookup,
            "DELULU_MIN_SYNOPSIS_LENGTH",
            defaults.min_synopsis_length,
        )?;
        let per_item_summaries = match lookup("DELULU_PER_ITEM_SUMMARIES") {
            Some(v) => parse_flag(&v)?,
            None => defaults.per_item_summaries,
        };
        let output_mode = match lookup("DELULU_OUTPUT_MODE") {
            Some(v) => v.parse()?,
            None => defaults.output_mode,
        };
        let llm_config_file = lookup("DELULU_LLM_CONFIG")
            .map(PathBuf::from)
            .unwrap_or(defaults.llm_config_file);

        Ok(Self {
            port,
            min_text_length,
            min_extracted_length,
            min_synopsis_length,
            per_item_summaries,
            output_mode,
            llm_config_file,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has invalid value {:?}", key, raw))),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!("invalid boolean: {}", other))),
    }
}
