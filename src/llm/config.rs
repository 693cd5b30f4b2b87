//! Configuration for the chat completion backend

use std::time::Duration;

/// Default chat backend address (an Ollama-style OpenAI-compatible server)
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434/v1";

/// Configuration for the streaming chat client
#[derive(Clone, Debug, PartialEq)]
pub struct LLMConfig {
    /// Base URL of the OpenAI-compatible API, including any `/v1` prefix
    pub base_url: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Connect timeout for requests (streams have no overall deadline)
    pub connect_timeout: Duration,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: "ollama".to_string(),
            model: "qwen2.5:latest".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl LLMConfig {
    /// Create a new configuration for the given backend
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
