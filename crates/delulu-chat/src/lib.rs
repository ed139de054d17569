//! LLM access for the analyzer: provider selection and completion calls
//! against OpenAI, Anthropic, and Groq.
//!
//! Completions are streamed over SSE and collected into one text blob.

pub mod config;
pub mod providers;
pub mod types;

pub use config::LLMConfig;
pub use types::*;
