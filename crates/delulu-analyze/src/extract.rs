//! Image text extraction: per-image transcription with acceptance rules.

use std::sync::Arc;

use delulu_core::ImageSource;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::collaborators::Transcriber;

/// Phrases that mean the vision model refused or could not read the image.
/// Matched case-insensitively, and only where the model itself is speaking:
/// at the start of the text, or anywhere in an unattributed first line.
pub const REFUSAL_MARKERS: &[&str] = &[
    "i'm sorry, but",
    "i am sorry, but",
    "i can't help with",
    "i cannot help with",
    "i can't assist",
    "i cannot assist",
    "unable to read",
    "unable to extract",
    "unable to transcribe",
    "can't read the image",
    "cannot read the image",
    "no text found",
    "no text visible",
    "no readable text",
    "no conversation found",
    "error processing",
];

/// `Name:` at line start, as in a transcribed message.
static SENDER_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w .'()-]{1,40}:\s").unwrap());

/// Why an image's text was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("extracted text too short ({length} chars)")]
    TooShort { length: usize },

    #[error("transcriber refused or failed (matched {marker:?})")]
    Refusal { marker: &'static str },

    #[error("transcription call failed: {0}")]
    CallFailed(String),
}

/// Outcome of extracting one image.
pub type Extraction = std::result::Result<String, Rejection>;

/// Apply the acceptance rules to raw transcriber output, in order:
/// minimum length, then refusal markers.
pub fn validate_transcript(raw: &str, min_length: usize) -> Extraction {
    let text = raw.trim();
    let length = text.chars().count();
    if length == 0 || length < min_length {
        return Err(Rejection::TooShort { length });
    }

    if let Some(marker) = refusal_marker(text) {
        return Err(Rejection::Refusal { marker });
    }

    Ok(text.to_string())
}

/// Refusal marker in the model's own words, ignoring transcribed messages.
fn refusal_marker(text: &str) -> Option<&'static str> {
    let first_line = text.lines().next().unwrap_or_default().trim().to_lowercase();
    if let Some(&marker) = REFUSAL_MARKERS.iter().find(|m| first_line.starts_with(**m)) {
        return Some(marker);
    }
    if SENDER_PREFIX_RE.is_match(&first_line) {
        return None;
    }
    REFUSAL_MARKERS
        .iter()
        .find(|m| first_line.contains(**m))
        .copied()
}

/// Fans out transcription over a set of images.
pub struct ImageTextExtractor {
    transcriber: Arc<dyn Transcriber>,
    min_length: usize,
}

impl ImageTextExtractor {
    pub fn new(transcriber: Arc<dyn Transcriber>, min_length: usize) -> Self {
        Self {
            transcriber,
            min_length,
        }
    }

    /// Transcribe and validate one image. Never fails; errors become rejections.
    pub async fn extract_one(&self, image: &ImageSource) -> Extraction {
        match self.transcriber.transcribe(image).await {
            Ok(raw) => {
                debug!(raw = %raw, "Transcriber output");
                validate_transcript(&raw, self.min_length)
            }
            Err(e) => Err(Rejection::CallFailed(e.to_string())),
        }
    }

    /// Transcribe every image concurrently. Output slot `i` belongs to input `i`;
    /// one failing image never affects another.
    pub async fn extract_all(&self, images: &[ImageSource]) -> Vec<Extraction> {
        let results = join_all(images.iter().map(|img| self.extract_one(img))).await;

        for (index, result) in results.iter().enumerate() {
            if let Err(rejection) = result {
                warn!(index, reason = %rejection, "Image rejected by extractor");
            }
        }
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        info!(submitted = images.len(), accepted, "Image text extraction finished");

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use delulu_core::{Error, Result};

    #[test]
    fn test_accepts_conversation() {
        let text = validate_transcript("  Him: wanna hang?\nMe: sure!  ", 10).unwrap();
        assert_eq!(text, "Him: wanna hang?\nMe: sure!");
    }

    #[test]
    fn test_rejects_short_and_empty() {
        assert_eq!(validate_transcript("", 10), Err(Rejection::TooShort { length: 0 }));
        assert_eq!(validate_transcript("   hi  ", 10), Err(Rejection::TooShort { length: 2 }));
    }

    #[test]
    fn test_rejects_refusals_case_insensitively() {
        let result = validate_transcript("I'm Sorry, But I cannot process this image.", 10);
        assert!(matches!(result, Err(Rejection::Refusal { .. })));
        let result = validate_transcript("There is No Text Found in this screenshot", 10);
        assert!(matches!(result, Err(Rejection::Refusal { marker: "no text found" })));
    }

    #[test]
    fn test_ordinary_phrases_are_not_refusals() {
        assert!(validate_transcript("Him: can't wait 😏\nMe: I can't either", 10).is_ok());
    }

    #[test]
    fn test_markers_inside_messages_are_accepted() {
        let text = "Them: I'm sorry, but I don't think this is working\nMe: wow ok";
        assert_eq!(validate_transcript(text, 10), Ok(text.to_string()));

        let text = "Me: did you get my pic?\nThem: error processing on my end lol, i can't assist rn";
        assert!(validate_transcript(text, 10).is_ok());
    }

    #[test]
    fn test_marker_leading_the_reply_is_a_refusal() {
        let result = validate_transcript("Error processing image: unsupported format", 10);
        assert!(matches!(result, Err(Rejection::Refusal { marker: "error processing" })));
    }

    /// Transcribes URLs by echoing them; fails on anything containing "fail".
    struct EchoTranscriber;

    #[async_trait]
    impl Transcriber for EchoTranscriber {
        async fn transcribe(&self, image: &ImageSource) -> Result<String> {
            let url = image.as_url();
            if url.contains("fail") {
                return Err(Error::Upstream("vision call timed out".into()));
            }
            if url.contains("blank") {
                return Ok(String::new());
            }
            Ok(format!("Him: hello from {}", url))
        }
    }

    #[tokio::test]
    async fn test_extract_all_isolates_failures_and_keeps_order() {
        let extractor = ImageTextExtractor::new(Arc::new(EchoTranscriber), 10);
        let images = vec![
            ImageSource::Url("https://x.test/a.png".into()),
            ImageSource::Url("https://x.test/fail.png".into()),
            ImageSource::Url("https://x.test/blank.png".into()),
            ImageSource::Url("https://x.test/d.png".into()),
        ];
        let results = extractor.extract_all(&images).await;
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_deref(), Ok("Him: hello from https://x.test/a.png"));
        assert!(matches!(results[1], Err(Rejection::CallFailed(_))));
        assert!(matches!(results[2], Err(Rejection::TooShort { length: 0 })));
        assert!(results[3].as_ref().unwrap().ends_with("d.png"));
    }
}
