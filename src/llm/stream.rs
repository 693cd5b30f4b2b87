//! Streaming chat-completion client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint with
//! `stream: true`, yielding content deltas as the server-sent events arrive
//! so quotes can be spoken while the reply is still being generated.

use crate::llm::config::LLMConfig;
use crate::llm::context::ChatMessage;
use crate::{ReciteError, Result};
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde_json::json;
use tracing::debug;

/// Streaming client for an OpenAI-compatible chat backend
#[derive(Clone, Debug)]
pub struct LLMClient {
    http: reqwest::Client,
}

impl LLMClient {
    /// Create a new client
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ReciteError::ChatError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }

    /// Stream a chat completion, yielding content deltas in arrival order
    pub fn stream_chat(
        &self,
        config: &LLMConfig,
        messages: &[ChatMessage],
    ) -> impl Stream<Item = Result<String>> + 'static {
        let http = self.http.clone();
        let config = config.clone();
        let body = json!({
            "model": config.model,
            "messages": messages
                .iter()
                .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
                .collect::<Vec<_>>(),
            "stream": true,
        });

        try_stream! {
            let url = chat_completions_url(&config.base_url);
            let response = http
                .post(&url)
                .bearer_auth(&config.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| ReciteError::ChatError(format!("request failed: {e}")))?;

            let response = check_status(response).await?;

            let mut chunks = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            let mut done = false;

            while let Some(chunk) = chunks.next().await {
                let chunk = chunk
                    .map_err(|e| ReciteError::ChatError(format!("stream read failed: {e}")))?;
                buffer.extend_from_slice(&chunk);

                // Frames are newline-delimited; a partial line stays buffered
                // until the rest of it arrives.
                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line);
                    match parse_sse_line(line.trim()) {
                        SseLine::Delta(content) => yield content,
                        SseLine::Done => {
                            done = true;
                            break;
                        }
                        SseLine::Skip => {}
                    }
                }

                if done {
                    break;
                }
            }
        }
    }

    /// Fetch the model ids the backend advertises
    pub async fn fetch_models(&self, config: &LLMConfig) -> Result<Vec<String>> {
        let url = format!("{}/models", config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .bearer_auth(&config.api_key)
            .send()
            .await
            .map_err(|e| ReciteError::ChatError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReciteError::ChatError(format!("HTTP {status} from {url}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ReciteError::ChatError(format!("invalid models response: {e}")))?;

        let models = body["data"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ReciteError::ChatError(format!("HTTP {status}: {message}")))
}

/// One parsed line of the event stream
#[derive(Debug, PartialEq)]
enum SseLine {
    /// A content delta to append to the reply
    Delta(String),
    /// The `[DONE]` terminator
    Done,
    /// Anything else (empty lines, comments, deltas without content)
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data: ") else {
        return SseLine::Skip;
    };

    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(value) => match value["choices"][0]["delta"]["content"].as_str() {
            Some(content) if !content.is_empty() => SseLine::Delta(content.to_string()),
            _ => SseLine::Skip,
        },
        Err(e) => {
            debug!("Skipping unparseable SSE line: {}", e);
            SseLine::Skip
        }
    }
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delta_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_sse_line(line), SseLine::Delta("Hel".to_string()));
    }

    #[test]
    fn test_parse_done_line() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
    }

    #[test]
    fn test_parse_skips_empty_and_metadata() {
        assert_eq!(parse_sse_line(""), SseLine::Skip);
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"finish_reason":"stop"}]}"#),
            SseLine::Skip
        );
        assert_eq!(parse_sse_line("data: not json"), SseLine::Skip);
    }

    #[test]
    fn test_parse_skips_empty_content() {
        let line = r#"data: {"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(parse_sse_line(line), SseLine::Skip);
    }

    #[test]
    fn test_completions_url_normalizes_trailing_slash() {
        assert_eq!(
            chat_completions_url("http://localhost:11434/v1/"),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_url("http://localhost:11434/v1"),
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
