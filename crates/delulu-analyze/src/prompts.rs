//! Prompts sent to the external collaborators.

use delulu_core::OutputMode;

use crate::labels::ScoreLabels;

/// System prompt for image transcription.
pub const TRANSCRIBE_SYSTEM_PROMPT: &str = r#"You transcribe screenshots of text conversations.

Return only the literal conversation text shown in the image, one message per
line, prefixed with the sender as displayed. Do not describe the image, add
commentary, or summarize."#;

/// User instruction accompanying each image.
pub const TRANSCRIBE_INSTRUCTION: &str =
    "Transcribe the conversation in this screenshot exactly as written.";

/// System prompt for the assessment call.
pub const ASSESSMENT_SYSTEM_PROMPT: &str = r#"You are a sharp, witty relationship analyst who combines playful insight with grounded, logical advice.

Analyze conversations with a blend of warmth and directness. Focus on clear,
actionable insights without pop culture references."#;

/// System prompt for per-item synopses.
pub const SYNOPSIS_SYSTEM_PROMPT: &str = r#"You summarize a single text conversation in two or three sentences.

Describe the dynamic between the people talking. Do not give advice or a score."#;

fn label_lines(labels: &ScoreLabels) -> String {
    labels
        .iter()
        .map(|(score, label)| format!("   - Level {}: \"{}\"", score, label))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the assessment prompt for the requested output mode.
pub fn build_assessment_prompt(corpus: &str, mode: OutputMode, labels: &ScoreLabels) -> String {
    match mode {
        OutputMode::Prose => format!(
            r#"Analyze this conversation and output exactly 4 numbered sections in this order:

1. Delulu Score: Level (1-5) with description:
{labels}

2. Detailed Analysis: 2-3 analytical sentences about the conversation dynamics, patterns, and implications

3. Relationship Probability: A percentage (0-100%) with brief, logical reasoning

4. Strategic Advice: One clear, actionable recommendation based on the observed patterns

Here's the conversation to analyze:
{corpus}"#,
            labels = label_lines(labels),
            corpus = corpus,
        ),
        OutputMode::Json => format!(
            r#"Analyze this conversation. Respond with a single JSON object and nothing else, with fields:
- "delulu_score": integer 1-5 where
{labels}
- "summary": object with "narrative" (2-3 sentences) and "insights" (array of short bullet strings)
- "relationship_probability": integer 0-100
- "advice": array of concrete next steps

Conversation:
{corpus}"#,
            labels = label_lines(labels),
            corpus = corpus,
        ),
    }
}

/// Build the synopsis prompt for one conversation.
pub fn build_synopsis_prompt(text: &str) -> String {
    format!("Summarize this conversation:\n\n{}", text)
}
