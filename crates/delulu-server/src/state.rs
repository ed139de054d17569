//! Shared application state.

use delulu_analyze::{LlmCollaborator, Pipeline};
use delulu_chat::LLMProvider;
use delulu_core::{AnalyzerConfig, Error};

/// Provider the pipeline talks to, reported by the status route.
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub provider: LLMProvider,
    pub model: String,
}

pub struct AppState {
    pub config: AnalyzerConfig,
    pub provider: Option<ProviderInfo>,
    pipeline: Option<Pipeline>,
}

impl AppState {
    pub fn new(
        config: AnalyzerConfig,
        pipeline: Option<Pipeline>,
        provider: Option<ProviderInfo>,
    ) -> Self {
        Self {
            config,
            provider,
            pipeline,
        }
    }

    pub fn with_llm(config: AnalyzerConfig, llm: LlmCollaborator) -> Self {
        let provider = ProviderInfo {
            provider: llm.provider(),
            model: llm.model().to_string(),
        };
        let pipeline = Pipeline::with_llm(&config, llm);
        Self::new(config, Some(pipeline), Some(provider))
    }

    /// The pipeline, or a configuration error when no provider was set up.
    pub fn pipeline(&self) -> Result<&Pipeline, Error> {
        self.pipeline
            .as_ref()
            .ok_or_else(|| Error::Config("no LLM provider has an API key".into()))
    }
}
