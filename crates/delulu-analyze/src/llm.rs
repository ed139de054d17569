//! Collaborators backed by a hosted LLM provider.

use std::time::Instant;

use async_trait::async_trait;
use delulu_chat::providers;
use delulu_chat::{ChatMessage, CompletionOptions, LLMConfig, LLMProvider};
use delulu_core::{Error, ImageSource, OutputMode, Result};
use reqwest::Client;
use tracing::{error, info};

use crate::collaborators::{Assessor, Synopsizer, Transcriber};
use crate::labels::ScoreLabels;
use crate::prompts;

/// Implements every collaborator seam against one resolved provider.
#[derive(Clone)]
pub struct LlmCollaborator {
    client: Client,
    provider: LLMProvider,
    model: String,
    api_key: String,
    labels: &'static ScoreLabels,
}

impl LlmCollaborator {
    pub fn new(
        provider: LLMProvider,
        model: impl Into<String>,
        api_key: impl Into<String>,
        labels: &'static ScoreLabels,
    ) -> Self {
        Self {
            client: Client::new(),
            provider,
            model: model.into(),
            api_key: api_key.into(),
            labels,
        }
    }

    /// Build from the LLM config, failing if no provider has a key.
    pub fn from_config(config: &LLMConfig, labels: &'static ScoreLabels) -> Result<Self> {
        let (provider, model, api_key) = config
            .resolve_provider()
            .ok_or_else(|| Error::Config("no LLM provider has an API key".into()))?;

        info!(provider = %provider, model = %model, "LLM collaborator initialized");

        Ok(Self::new(provider, model, api_key, labels))
    }

    pub fn provider(&self) -> LLMProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn labels(&self) -> &'static ScoreLabels {
        self.labels
    }

    async fn call(
        &self,
        purpose: &'static str,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<String> {
        let start = Instant::now();
        let result = providers::complete(
            &self.client,
            self.provider,
            messages,
            &self.model,
            &self.api_key,
            &options,
        )
        .await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(text) => info!(
                purpose,
                model = %self.model,
                elapsed_ms,
                response_length = text.len(),
                "LLM call completed"
            ),
            Err(e) => error!(
                purpose,
                model = %self.model,
                elapsed_ms,
                error = %e,
                "LLM call failed"
            ),
        }
        result
    }
}

#[async_trait]
impl Transcriber for LlmCollaborator {
    async fn transcribe(&self, image: &ImageSource) -> Result<String> {
        let messages = vec![
            ChatMessage::system(prompts::TRANSCRIBE_SYSTEM_PROMPT),
            ChatMessage::user_with_image(prompts::TRANSCRIBE_INSTRUCTION, image.clone()),
        ];
        let options = CompletionOptions {
            temperature: 0.0,
            max_tokens: 1500,
            json_mode: false,
        };
        self.call("transcribe", messages, options).await
    }
}

#[async_trait]
impl Assessor for LlmCollaborator {
    async fn assess(&self, corpus: &str, mode: OutputMode) -> Result<String> {
        let messages = vec![
            ChatMessage::system(prompts::ASSESSMENT_SYSTEM_PROMPT),
            ChatMessage::user(prompts::build_assessment_prompt(corpus, mode, self.labels)),
        ];
        let options = CompletionOptions {
            json_mode: mode == OutputMode::Json && self.provider != LLMProvider::Anthropic,
            ..CompletionOptions::default()
        };
        self.call("assess", messages, options).await
    }
}

#[async_trait]
impl Synopsizer for LlmCollaborator {
    async fn synopsize(&self, text: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(prompts::SYNOPSIS_SYSTEM_PROMPT),
            ChatMessage::user(prompts::build_synopsis_prompt(text)),
        ];
        let options = CompletionOptions {
            max_tokens: 300,
            ..CompletionOptions::default()
        };
        self.call("synopsize", messages, options).await
    }
}
