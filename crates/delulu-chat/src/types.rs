//! Provider-neutral chat types.

use delulu_core::ImageSource;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Anthropic,
    Groq,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Groq => write!(f, "groq"),
        }
    }
}

/// One piece of a multi-part message.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Image(ImageSource),
}

/// Chat message sent to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    /// A user message carrying an instruction and one image.
    pub fn user_with_image(text: impl Into<String>, image: ImageSource) -> Self {
        Self {
            role: "user".into(),
            parts: vec![ContentPart::Text(text.into()), ContentPart::Image(image)],
        }
    }

    /// Concatenated text parts, ignoring images.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn has_images(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, ContentPart::Image(_)))
    }

    /// Message in the OpenAI chat-completions shape (also used by Groq).
    pub fn to_openai(&self) -> Value {
        if !self.has_images() {
            return json!({"role": self.role, "content": self.text()});
        }
        let content: Vec<Value> = self
            .parts
            .iter()
            .map(|p| match p {
                ContentPart::Text(t) => json!({"type": "text", "text": t}),
                ContentPart::Image(img) => {
                    json!({"type": "image_url", "image_url": {"url": img.as_url()}})
                }
            })
            .collect();
        json!({"role": self.role, "content": content})
    }

    /// Message in the Anthropic Messages shape.
    pub fn to_anthropic(&self) -> Value {
        if !self.has_images() {
            return json!({"role": self.role, "content": self.text()});
        }
        let content: Vec<Value> = self
            .parts
            .iter()
            .map(|p| match p {
                ContentPart::Text(t) => json!({"type": "text", "text": t}),
                ContentPart::Image(ImageSource::Url(url)) => json!({
                    "type": "image",
                    "source": {"type": "url", "url": url},
                }),
                ContentPart::Image(ImageSource::Inline { data, media_type }) => json!({
                    "type": "image",
                    "source": {"type": "base64", "media_type": media_type, "data": data},
                }),
            })
            .collect();
        json!({"role": self.role, "content": content})
    }
}

/// Sampling options for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f64,
    pub max_tokens: usize,
    /// Ask OpenAI-compatible providers for a JSON object response.
    pub json_mode: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            json_mode: false,
        }
    }
}
