//! Per-item synopses for batch mode.

use std::sync::Arc;

use futures::future::join_all;
use tracing::warn;

use crate::collaborators::Synopsizer;
use crate::corpus::Corpus;
use crate::types::FILLER_SYNOPSIS;

pub struct PerItemSummarizer {
    synopsizer: Arc<dyn Synopsizer>,
    min_length: usize,
}

impl PerItemSummarizer {
    pub fn new(synopsizer: Arc<dyn Synopsizer>, min_length: usize) -> Self {
        Self {
            synopsizer,
            min_length,
        }
    }

    async fn summarize_one(&self, text: &str) -> String {
        match self.synopsizer.synopsize(text).await {
            Ok(raw) => {
                let synopsis = raw.trim();
                let length = synopsis.chars().count();
                if length < self.min_length {
                    warn!(length, "Synopsis too short, using filler");
                    FILLER_SYNOPSIS.to_string()
                } else {
                    synopsis.to_string()
                }
            }
            Err(e) => {
                warn!(error = %e, "Synopsis call failed, using filler");
                FILLER_SYNOPSIS.to_string()
            }
        }
    }

    /// One synopsis per accepted text, in corpus order. Always `corpus.len()` long.
    pub async fn summarize_all(&self, corpus: &Corpus) -> Vec<String> {
        join_all(corpus.texts().map(|t| self.summarize_one(t))).await
    }
}
