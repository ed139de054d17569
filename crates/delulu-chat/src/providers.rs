//! External LLM provider streaming implementations.
//!
//! Each provider streams tokens via SSE from their respective APIs.
//! OpenAI and Groq use the same format. Anthropic uses a different one.
//! [`complete`] drains a stream into a single text blob.

use std::pin::Pin;

use delulu_core::{Error, Result};
use futures::Stream;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::types::{ChatMessage, CompletionOptions, LLMProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Stream tokens from the appropriate provider.
pub fn stream_llm(
    client: &Client,
    provider: LLMProvider,
    messages: Vec<ChatMessage>,
    model: &str,
    api_key: &str,
    options: &CompletionOptions,
) -> BoxedStream {
    match provider {
        LLMProvider::OpenAI => Box::pin(stream_openai_compat(
            client.clone(),
            OPENAI_URL,
            messages,
            model.to_string(),
            api_key.to_string(),
            options.clone(),
        )),
        LLMProvider::Groq => Box::pin(stream_openai_compat(
            client.clone(),
            GROQ_URL,
            messages,
            model.to_string(),
            api_key.to_string(),
            options.clone(),
        )),
        LLMProvider::Anthropic => Box::pin(stream_anthropic(
            client.clone(),
            messages,
            model.to_string(),
            api_key.to_string(),
            options.clone(),
        )),
    }
}

/// Run one completion and collect the streamed tokens into a single string.
pub async fn complete(
    client: &Client,
    provider: LLMProvider,
    messages: Vec<ChatMessage>,
    model: &str,
    api_key: &str,
    options: &CompletionOptions,
) -> Result<String> {
    let stream = stream_llm(client, provider, messages, model, api_key, options);
    collect_stream(stream).await
}

/// Drain a token stream. An error chunk fails the whole completion.
pub async fn collect_stream<S>(stream: S) -> Result<String>
where
    S: Stream<Item = StreamChunk>,
{
    tokio::pin!(stream);

    let mut full_response = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(text) => full_response.push_str(&text),
            StreamChunk::Done { .. } => break,
            StreamChunk::Error(e) => return Err(Error::Upstream(e)),
        }
    }
    Ok(full_response)
}

/// Splits a byte stream into SSE lines. Bytes are held until a full line
/// arrives, so characters split across network chunks decode intact.
#[derive(Debug, Default)]
pub struct SseLines {
    buffer: Vec<u8>,
}

impl SseLines {
    /// Append `bytes` and return every line completed by them, trimmed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            lines.push(String::from_utf8_lossy(&line).trim().to_string());
        }
        lines
    }
}

/// Request body for OpenAI-compatible APIs.
pub fn openai_body(messages: &[ChatMessage], model: &str, options: &CompletionOptions) -> Value {
    let msgs: Vec<Value> = messages.iter().map(ChatMessage::to_openai).collect();
    let mut body = json!({
        "model": model,
        "messages": msgs,
        "temperature": options.temperature,
        "max_tokens": options.max_tokens,
        "stream": true,
    });
    if options.json_mode {
        body["response_format"] = json!({"type": "json_object"});
    }
    body
}

/// Request body for Anthropic's Messages API. The system message moves to `system`.
pub fn anthropic_body(messages: &[ChatMessage], model: &str, options: &CompletionOptions) -> Value {
    let system_msg: Option<String> = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.text());

    let conv_msgs: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(ChatMessage::to_anthropic)
        .collect();

    let mut body = json!({
        "model": model,
        "messages": conv_msgs,
        "temperature": options.temperature,
        "max_tokens": options.max_tokens,
        "stream": true,
    });
    if let Some(sys) = system_msg {
        body["system"] = json!(sys);
    }
    body
}

/// Interpret one OpenAI-style SSE `data:` payload.
pub fn parse_openai_data(data: &str) -> Option<StreamChunk> {
    if data.trim() == "[DONE]" {
        return Some(StreamChunk::Done { tokens_used: 0 });
    }
    let parsed: Value = serde_json::from_str(data).ok()?;
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return Some(StreamChunk::Error(msg.to_string()));
    }
    parsed["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|c| !c.is_empty())
        .map(|c| StreamChunk::Token(c.to_string()))
}

/// Interpret one Anthropic SSE `data:` payload.
pub fn parse_anthropic_data(data: &str) -> Option<StreamChunk> {
    let parsed: Value = serde_json::from_str(data).ok()?;
    match parsed["type"].as_str() {
        Some("content_block_delta") => parsed["delta"]["text"]
            .as_str()
            .filter(|t| !t.is_empty())
            .map(|t| StreamChunk::Token(t.to_string())),
        Some("message_stop") => Some(StreamChunk::Done { tokens_used: 0 }),
        Some("error") => {
            let msg = parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error");
            error!("Anthropic error: {}", msg);
            Some(StreamChunk::Error(msg.to_string()))
        }
        _ => None,
    }
}

/// Stream from OpenAI-compatible APIs (OpenAI, Groq).
fn stream_openai_compat(
    client: Client,
    url: &str,
    messages: Vec<ChatMessage>,
    model: String,
    api_key: String,
    options: CompletionOptions,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    let url = url.to_string();
    let body = openai_body(&messages, &model, &options);

    async_stream::stream! {
        debug!("Streaming from {} with model {}", url, model);

        let response = match client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut lines = SseLines::default();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };

            for line in lines.push(&bytes) {
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }

                if let Some(data) = line.strip_prefix("data: ") {
                    match parse_openai_data(data) {
                        Some(StreamChunk::Token(t)) => {
                            token_count += 1;
                            yield StreamChunk::Token(t);
                        }
                        Some(StreamChunk::Done { .. }) => {
                            yield StreamChunk::Done { tokens_used: token_count };
                            return;
                        }
                        Some(StreamChunk::Error(e)) => {
                            yield StreamChunk::Error(e);
                            return;
                        }
                        None => {}
                    }
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Stream from Anthropic's Messages API.
fn stream_anthropic(
    client: Client,
    messages: Vec<ChatMessage>,
    model: String,
    api_key: String,
    options: CompletionOptions,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    let body = anthropic_body(&messages, &model, &options);

    async_stream::stream! {
        debug!("Streaming from Anthropic with model {}", model);

        let response = match client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut lines = SseLines::default();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };

            for line in lines.push(&bytes) {
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }

                // Anthropic uses "event: " lines followed by "data: " lines
                if let Some(data) = line.strip_prefix("data: ") {
                    match parse_anthropic_data(data) {
                        Some(StreamChunk::Token(t)) => {
                            token_count += 1;
                            yield StreamChunk::Token(t);
                        }
                        Some(StreamChunk::Done { .. }) => {
                            yield StreamChunk::Done { tokens_used: token_count };
                            return;
                        }
                        Some(StreamChunk::Error(e)) => {
                            yield StreamChunk::Error(e);
                            return;
                        }
                        None => {}
                    }
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_lines_keep_split_characters_intact() {
        let event = "data: {\"choices\":[{\"delta\":{\"content\":\"Me: 😏\"}}]}\n\n";
        let bytes = event.as_bytes();
        let emoji_start = event.find('😏').unwrap();
        let (head, tail) = bytes.split_at(emoji_start + 2);

        let mut lines = SseLines::default();
        assert!(lines.push(head).is_empty());
        let completed = lines.push(tail);
        assert_eq!(completed.len(), 2);
        let data = completed[0].strip_prefix("data: ").unwrap();
        assert_eq!(parse_openai_data(data), Some(StreamChunk::Token("Me: 😏".into())));
        assert_eq!(completed[1], "");
    }

    #[test]
    fn test_sse_lines_handles_crlf_and_multiple_lines_per_chunk() {
        let mut lines = SseLines::default();
        let out = lines.push(b"event: ping\r\ndata: [DONE]\r\npartial");
        assert_eq!(out, vec!["event: ping".to_string(), "data: [DONE]".to_string()]);
        assert_eq!(lines.push(b" line\n"), vec!["partial line".to_string()]);
    }

    #[test]
    fn test_parse_openai_token_and_done() {
        let data = r#"{"choices":[{"delta":{"content":"Level"}}]}"#;
        assert_eq!(parse_openai_data(data), Some(StreamChunk::Token("Level".into())));
        assert_eq!(parse_openai_data("[DONE]"), Some(StreamChunk::Done { tokens_used: 0 }));
        assert_eq!(parse_openai_data(r#"{"choices":[{"delta":{}}]}"#), None);
    }

    #[test]
    fn test_parse_anthropic_events() {
        let delta = r#"{"type":"content_block_delta","delta":{"text":"62%"}}"#;
        assert_eq!(parse_anthropic_data(delta), Some(StreamChunk::Token("62%".into())));
        assert_eq!(
            parse_anthropic_data(r#"{"type":"message_stop"}"#),
            Some(StreamChunk::Done { tokens_used: 0 })
        );
        let err = r#"{"type":"error","error":{"message":"overloaded"}}"#;
        assert_eq!(parse_anthropic_data(err), Some(StreamChunk::Error("overloaded".into())));
        assert_eq!(parse_anthropic_data(r#"{"type":"ping"}"#), None);
    }

    #[test]
    fn test_openai_body_json_mode() {
        let messages = vec![ChatMessage::system("be terse"), ChatMessage::user("hi")];
        let options = CompletionOptions {
            json_mode: true,
            ..CompletionOptions::default()
        };
        let body = openai_body(&messages, "gpt-4o-mini", &options);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);

        let plain = openai_body(&messages, "gpt-4o-mini", &CompletionOptions::default());
        assert!(plain.get("response_format").is_none());
    }

    #[test]
    fn test_anthropic_body_moves_system() {
        let messages = vec![ChatMessage::system("be terse"), ChatMessage::user("hi")];
        let body = anthropic_body(&messages, "claude", &CompletionOptions::default());
        assert_eq!(body["system"], "be terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_collect_stream() {
        let chunks = vec![
            StreamChunk::Token("Level ".into()),
            StreamChunk::Token("3".into()),
            StreamChunk::Done { tokens_used: 2 },
            StreamChunk::Token("ignored".into()),
        ];
        let text = collect_stream(tokio_stream::iter(chunks)).await.unwrap();
        assert_eq!(text, "Level 3");
    }

    #[tokio::test]
    async fn test_collect_stream_error() {
        let chunks = vec![
            StreamChunk::Token("partial".into()),
            StreamChunk::Error("API error 500".into()),
        ];
        let err = collect_stream(tokio_stream::iter(chunks)).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
