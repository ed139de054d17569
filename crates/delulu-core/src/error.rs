//! Error types for the analyzer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed request input. The message is shown to the caller as-is.
    #[error("{0}")]
    InvalidInput(String),

    /// Every submitted image was rejected by the extractor.
    #[error("No usable text extracted from {submitted} image(s)")]
    NoUsableText { submitted: usize },

    /// Neither output mode yielded a usable assessment.
    #[error("Unparseable assessment output: {0}")]
    Unparseable(String),

    /// An external collaborator call failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short, stable message for callers. One per failure category.
    pub fn public_message(&self) -> String {
        match self {
            Error::InvalidInput(msg) => msg.clone(),
            Error::NoUsableText { .. } => {
                "Could not read any conversation text from the submitted images".into()
            }
            Error::Unparseable(_) => "The analysis service did not return parseable output".into(),
            Error::Upstream(_) => "The analysis service is unavailable".into(),
            Error::Config(_) => "No LLM provider configured".into(),
            Error::Io(_) | Error::Json(_) | Error::Internal(_) => "Internal server error".into(),
        }
    }

    /// Diagnostic detail for server-side failures, if any.
    pub fn details(&self) -> Option<String> {
        match self {
            Error::InvalidInput(_) | Error::NoUsableText { .. } => None,
            other => Some(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_messages_are_distinct_per_category() {
        let errors = [
            Error::InvalidInput("Text content is required".into()),
            Error::NoUsableText { submitted: 2 },
            Error::Unparseable("garbage".into()),
            Error::Upstream("timeout".into()),
            Error::Config("no key".into()),
            Error::Internal("boom".into()),
        ];
        let messages: Vec<String> = errors.iter().map(|e| e.public_message()).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_details_hidden_for_client_errors() {
        assert!(Error::InvalidInput("bad".into()).details().is_none());
        assert!(Error::NoUsableText { submitted: 1 }.details().is_none());
        let details = Error::Upstream("connection reset".into()).details().unwrap();
        assert!(details.contains("connection reset"));
    }
}
