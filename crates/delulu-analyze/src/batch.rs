//! Batch assembly: one output item per input, in input order.

use std::collections::HashMap;

use tracing::debug;

use crate::corpus::Corpus;
use crate::extract::Extraction;
use crate::types::{AnalysisResult, BatchItem, BatchResult, Identity};

/// Error attached to an item whose image produced no usable text.
pub const EXTRACTION_FAILED: &str = "Could not extract text from image";

/// Per-item synopses, aligned with the accepted texts of a corpus.
pub struct Synopses<'a> {
    corpus: &'a Corpus,
    texts: Vec<String>,
}

impl<'a> Synopses<'a> {
    pub fn new(corpus: &'a Corpus, texts: Vec<String>) -> Self {
        Self { corpus, texts }
    }

    /// Input position → synopsis.
    fn by_position(self) -> HashMap<usize, String> {
        self.corpus.positions().zip(self.texts).collect()
    }
}

pub struct BatchAssembler;

impl BatchAssembler {
    /// Broadcast the combined result to every accepted input and mark every
    /// rejected input as failed. When synopses are given, each accepted item's
    /// narrative is replaced by its own synopsis.
    pub fn assemble(
        identities: Vec<Identity>,
        extractions: &[Extraction],
        result: &AnalysisResult,
        synopses: Option<Synopses<'_>>,
    ) -> BatchResult {
        let mut synopses = synopses.map(Synopses::by_position).unwrap_or_default();

        let items: Vec<BatchItem> = identities
            .into_iter()
            .zip(extractions)
            .enumerate()
            .map(|(position, (identity, extraction))| match extraction {
                Ok(_) => {
                    let summary = match synopses.remove(&position) {
                        Some(synopsis) => result.summary().with_narrative(synopsis),
                        None => result.summary().clone(),
                    };
                    BatchItem::succeeded(identity, result, summary)
                }
                Err(rejection) => {
                    debug!(identity = %identity, reason = %rejection, "Marking item failed");
                    BatchItem::failed(identity, EXTRACTION_FAILED)
                }
            })
            .collect();

        BatchResult::from_items(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Rejection;
    use crate::normalize::Normalizer;
    use crate::types::Summary;

    fn combined() -> AnalysisResult {
        Normalizer::default()
            .normalize(
                r#"{"delulu_score": 2, "summary": {"narrative": "Overall vibe.", "insights": ["one"]}, "relationship_probability": 30, "advice": "Chill."}"#,
            )
            .unwrap()
    }

    fn identities() -> Vec<Identity> {
        vec![
            Identity::Url("https://img.example/a.png".into()),
            Identity::Index(1),
            Identity::Url("https://img.example/c.png".into()),
        ]
    }

    #[test]
    fn test_failed_items_are_null_and_counts_match() {
        let extractions: Vec<Extraction> = vec![
            Ok("first conversation".into()),
            Err(Rejection::Refusal { marker: "no text found" }),
            Ok("third conversation".into()),
        ];
        let batch = BatchAssembler::assemble(identities(), &extractions, &combined(), None);

        assert_eq!(batch.total_submitted(), 3);
        assert_eq!(batch.items().len(), 3);
        assert_eq!(batch.successful_count(), 2);

        let failed = &batch.items()[1];
        assert_eq!(failed.identity(), &Identity::Index(1));
        assert_eq!(failed.error(), Some(EXTRACTION_FAILED));
        assert!(failed.score().is_none());
        assert!(failed.score_label().is_none());
        assert!(failed.summary().is_none());
        assert!(failed.probability().is_none());
        assert!(failed.advice().is_none());

        let ok = &batch.items()[2];
        assert_eq!(ok.identity(), &Identity::Url("https://img.example/c.png".into()));
        assert_eq!(ok.probability(), Some(30));
        assert_eq!(ok.summary().map(Summary::narrative), Some("Overall vibe."));
    }

    #[test]
    fn test_synopses_follow_corpus_positions() {
        let extractions: Vec<Extraction> = vec![
            Err(Rejection::TooShort { length: 3 }),
            Ok("second conversation".into()),
            Ok("third conversation".into()),
        ];
        let corpus = Corpus::combine(&extractions).unwrap();
        let synopses = Synopses::new(
            &corpus,
            vec!["Second synopsis.".into(), "Third synopsis.".into()],
        );
        let batch =
            BatchAssembler::assemble(identities(), &extractions, &combined(), Some(synopses));

        assert!(batch.items()[0].summary().is_none());
        assert_eq!(
            batch.items()[1].summary(),
            Some(&Summary::Structured {
                narrative: "Second synopsis.".into(),
                insights: vec!["one".into()],
            })
        );
        assert_eq!(
            batch.items()[2].summary().map(Summary::narrative),
            Some("Third synopsis.")
        );
    }

    #[test]
    fn test_serialized_shape() {
        let extractions: Vec<Extraction> = vec![Ok("only".into())];
        let batch = BatchAssembler::assemble(
            vec![Identity::Index(0)],
            &extractions,
            &combined(),
            None,
        );
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["totalSubmitted"], 1);
        assert_eq!(value["successfulCount"], 1);
        assert_eq!(value["items"][0]["identity"], 0);
        assert_eq!(value["items"][0]["delulu_score"], 2);
        assert!(value["items"][0]["error"].is_null());
    }
}
