//! The analysis pipeline: extraction → corpus → (synopses) → assessment →
//! normalization → batch assembly.

use std::sync::Arc;

use delulu_core::{AnalyzerConfig, Error, ImageSource, OutputMode, Result};
use tracing::{info, warn};

use crate::assess::AssessmentInvoker;
use crate::batch::{BatchAssembler, Synopses};
use crate::collaborators::{Assessor, Synopsizer, Transcriber};
use crate::corpus::Corpus;
use crate::extract::ImageTextExtractor;
use crate::labels::ScoreLabels;
use crate::llm::LlmCollaborator;
use crate::normalize::{FieldPolicies, Normalizer};
use crate::summarize::PerItemSummarizer;
use crate::types::{AnalysisResult, BatchResult, Identity};

pub struct Pipeline {
    extractor: ImageTextExtractor,
    summarizer: PerItemSummarizer,
    invoker: AssessmentInvoker,
    normalizer: Normalizer,
    min_text_length: usize,
    per_item_summaries: bool,
}

impl Pipeline {
    pub fn new(
        config: &AnalyzerConfig,
        transcriber: Arc<dyn Transcriber>,
        assessor: Arc<dyn Assessor>,
        synopsizer: Arc<dyn Synopsizer>,
        labels: &'static ScoreLabels,
    ) -> Self {
        Self {
            extractor: ImageTextExtractor::new(transcriber, config.min_extracted_length),
            summarizer: PerItemSummarizer::new(synopsizer, config.min_synopsis_length),
            invoker: AssessmentInvoker::new(assessor, config.output_mode),
            normalizer: Normalizer::new(labels),
            min_text_length: config.min_text_length,
            per_item_summaries: config.per_item_summaries,
        }
    }

    /// Every stage backed by the same LLM provider.
    pub fn with_llm(config: &AnalyzerConfig, llm: LlmCollaborator) -> Self {
        let labels = llm.labels();
        let llm = Arc::new(llm);
        Self::new(config, llm.clone(), llm.clone(), llm, labels)
    }

    pub fn with_field_policies(mut self, policies: FieldPolicies) -> Self {
        self.normalizer = self.normalizer.with_policies(policies);
        self
    }

    pub fn output_mode(&self) -> OutputMode {
        self.invoker.mode()
    }

    /// Assess one directly submitted conversation.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Text content is required".into()));
        }
        if text.chars().count() < self.min_text_length {
            return Err(Error::InvalidInput(format!(
                "Text content must be at least {} characters",
                self.min_text_length
            )));
        }

        info!(length = text.len(), "Analyzing text submission");
        self.assess(&Corpus::single(text)).await
    }

    /// Assess the conversation shown in a single image.
    pub async fn analyze_image(&self, image: &ImageSource) -> Result<AnalysisResult> {
        info!("Analyzing single image");
        let text = self.extractor.extract_one(image).await.map_err(|rejection| {
            warn!(reason = %rejection, "Single image rejected");
            Error::NoUsableText { submitted: 1 }
        })?;
        self.assess(&Corpus::single(text)).await
    }

    /// Assess a batch of images as one conversation and report per image.
    ///
    /// Fails without calling the assessor when no image yields usable text.
    pub async fn analyze_batch(&self, images: Vec<(Identity, ImageSource)>) -> Result<BatchResult> {
        if images.is_empty() {
            return Err(Error::InvalidInput("At least one image is required".into()));
        }
        let (identities, sources): (Vec<Identity>, Vec<ImageSource>) = images.into_iter().unzip();
        info!(submitted = sources.len(), "Analyzing image batch");

        let extractions = self.extractor.extract_all(&sources).await;
        let corpus = Corpus::combine(&extractions)?;

        let synopses = async {
            if self.per_item_summaries {
                Some(self.summarizer.summarize_all(&corpus).await)
            } else {
                None
            }
        };
        let (result, synopses) = futures::join!(self.assess(&corpus), synopses);
        let result = result?;

        let batch = BatchAssembler::assemble(
            identities,
            &extractions,
            &result,
            synopses.map(|texts| Synopses::new(&corpus, texts)),
        );
        info!(
            submitted = batch.total_submitted(),
            successful = batch.successful_count(),
            "Image batch analyzed"
        );
        Ok(batch)
    }

    async fn assess(&self, corpus: &Corpus) -> Result<AnalysisResult> {
        let blob = self.invoker.invoke(corpus).await?;
        self.normalizer.normalize(&blob)
    }
}
