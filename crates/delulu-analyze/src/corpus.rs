//! Corpus combination: accepted per-image texts joined into one document.

use delulu_core::{Error, Result};

use crate::extract::Extraction;

/// Separator placed between consecutive images' text.
pub const SEPARATOR: &str = "\n\n--- Next Screenshot ---\n\n";

/// Accepted texts in input order, each tagged with its input position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<(usize, String)>,
}

impl Corpus {
    /// Keep accepted extractions; fail if none survived.
    pub fn combine(extractions: &[Extraction]) -> Result<Self> {
        let entries: Vec<(usize, String)> = extractions
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().ok().map(|text| (i, text.clone())))
            .collect();

        if entries.is_empty() {
            return Err(Error::NoUsableText {
                submitted: extractions.len(),
            });
        }
        Ok(Self { entries })
    }

    /// Corpus built from one directly submitted text.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            entries: vec![(0, text.into())],
        }
    }

    /// Input positions of the accepted texts, ascending.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(i, _)| *i)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(_, t)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The combined text sent to the assessment call.
    pub fn joined(&self) -> String {
        self.texts().collect::<Vec<_>>().join(SEPARATOR)
    }
}
