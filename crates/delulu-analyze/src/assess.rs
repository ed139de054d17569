//! Assessment invocation.

use std::sync::Arc;

use delulu_core::{Error, OutputMode, Result};
use tracing::{debug, info};

use crate::collaborators::Assessor;
use crate::corpus::Corpus;

pub struct AssessmentInvoker {
    assessor: Arc<dyn Assessor>,
    mode: OutputMode,
}

impl AssessmentInvoker {
    pub fn new(assessor: Arc<dyn Assessor>, mode: OutputMode) -> Self {
        Self { assessor, mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Send the combined corpus and return the raw assessment blob.
    pub async fn invoke(&self, corpus: &Corpus) -> Result<String> {
        if corpus.is_empty() {
            return Err(Error::Internal("assessment invoked with an empty corpus".into()));
        }
        let text = corpus.joined();
        info!(
            mode = %self.mode,
            items = corpus.len(),
            corpus_length = text.len(),
            "Requesting assessment"
        );

        let blob = self.assessor.assess(&text, self.mode).await?;
        debug!(blob = %blob, "Assessment output");

        if blob.trim().is_empty() {
            return Err(Error::Unparseable("assessment returned no content".into()));
        }
        Ok(blob)
    }
}
