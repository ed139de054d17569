//! Turns conversation text or screenshots into a typed, validated
//! delulu assessment.
//!
//! Pipeline stages, in order: image text extraction ([`extract`]), corpus
//! combination ([`corpus`]), optional per-item synopses ([`summarize`]), the
//! assessment call ([`assess`]), response normalization ([`normalize`]), and
//! batch assembly ([`batch`]). [`Pipeline`] wires them together.

pub mod assess;
pub mod batch;
pub mod collaborators;
pub mod corpus;
pub mod extract;
pub mod labels;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod summarize;
pub mod types;

pub use collaborators::{Assessor, Synopsizer, Transcriber};
pub use labels::{Score, ScoreLabels, DELULU_LABELS};
pub use llm::LlmCollaborator;
pub use normalize::{FieldPolicies, FieldPolicy, Normalizer};
pub use pipeline::Pipeline;
pub use types::*;
