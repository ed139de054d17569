//! LLM configuration loading and provider selection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::LLMProvider;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.2-90b-vision-preview";

/// Stored LLM configuration (read from llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Load config from file, filling missing keys from `lookup`.
    pub fn load_with<F>(config_path: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: LLMConfig = match std::fs::read_to_string(config_path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(c) => {
                    info!("Loaded LLM config from {}", config_path.display());
                    c
                }
                Err(e) => {
                    warn!(path = %config_path.display(), error = %e, "Invalid LLM config file, using defaults");
                    LLMConfig::default()
                }
            },
            Err(_) => LLMConfig::default(),
        };

        // Env vars as fallback for API keys
        if config.openai_api_key.is_none() {
            config.openai_api_key = lookup("OPENAI_API_KEY");
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = lookup("ANTHROPIC_API_KEY");
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = lookup("GROQ_API_KEY");
        }

        config
    }

    /// Resolve which provider and model to use.
    pub fn resolve_provider(&self) -> Option<(LLMProvider, String, String)> {
        // Explicit preference
        if self.preferred_provider != "auto" {
            return match self.preferred_provider.as_str() {
                "openai" => self
                    .openai_api_key
                    .as_ref()
                    .map(|k| (LLMProvider::OpenAI, self.openai_model.clone(), k.clone())),
                "anthropic" => self
                    .anthropic_api_key
                    .as_ref()
                    .map(|k| (LLMProvider::Anthropic, self.anthropic_model.clone(), k.clone())),
                "groq" => self
                    .groq_api_key
                    .as_ref()
                    .map(|k| (LLMProvider::Groq, self.groq_model.clone(), k.clone())),
                _ => None,
            };
        }

        // Auto mode: Anthropic > Groq > OpenAI
        if let Some(k) = &self.anthropic_api_key {
            return Some((LLMProvider::Anthropic, self.anthropic_model.clone(), k.clone()));
        }
        if let Some(k) = &self.groq_api_key {
            return Some((LLMProvider::Groq, self.groq_model.clone(), k.clone()));
        }
        if let Some(k) = &self.openai_api_key {
            return Some((LLMProvider::OpenAI, self.openai_model.clone(), k.clone()));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LLMConfig::load_with(&dir.path().join("missing.json"), no_env);
        assert_eq!(config.preferred_provider, "auto");
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_file_keys_and_env_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-config.json");
        std::fs::write(&path, r#"{"openai_api_key": "sk-file", "openai_model": "gpt-4o"}"#).unwrap();

        let config = LLMConfig::load_with(&path, |key| {
            (key == "GROQ_API_KEY").then(|| "gsk-env".to_string())
        });
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.groq_api_key.as_deref(), Some("gsk-env"));

        // Auto prefers Groq over OpenAI
        let (provider, model, key) = config.resolve_provider().unwrap();
        assert_eq!(provider, LLMProvider::Groq);
        assert_eq!(model, DEFAULT_GROQ_MODEL);
        assert_eq!(key, "gsk-env");
    }

    #[test]
    fn test_explicit_preference_without_key() {
        let config = LLMConfig {
            preferred_provider: "anthropic".into(),
            openai_api_key: Some("sk".into()),
            ..LLMConfig::default()
        };
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-config.json");
        std::fs::write(&path, "not json").unwrap();
        let config = LLMConfig::load_with(&path, |key| {
            (key == "OPENAI_API_KEY").then(|| "sk-env".to_string())
        });
        let (provider, model, _) = config.resolve_provider().unwrap();
        assert_eq!(provider, LLMProvider::OpenAI);
        assert_eq!(model, DEFAULT_OPENAI_MODEL);
    }
}
