//! HTTP client for the remote speech synthesis service
//!
//! A thin request/response wrapper around the backend's REST API. There is
//! no retry policy here; the playback queue decides what a failed fragment
//! means.

use crate::speech::config::{ResponseFormat, TTSConfig};
use crate::speech::Synthesizer;
use crate::{ReciteError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JSON body for `POST /v1/audio/speech`
#[derive(Clone, Debug, Serialize)]
pub struct TTSRequest {
    pub input: String,
    pub voice: String,
    pub emotion: String,
    pub speed: f32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    pub response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_name: Option<String>,
}

impl TTSRequest {
    fn new(text: &str, config: &TTSConfig, save: &SaveOptions) -> Self {
        Self {
            input: text.to_string(),
            voice: config.voice.clone(),
            emotion: config.emotion.clone(),
            speed: config.speed,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            repetition_penalty: config.repetition_penalty,
            response_format: config.response_format,
            save_audio: save.save_audio.then_some(true),
            save_name: save.save_name.clone(),
        }
    }
}

/// Server-side save options for a synthesis call
#[derive(Clone, Debug, Default)]
pub struct SaveOptions {
    /// Ask the backend to keep a copy of the generated audio
    pub save_audio: bool,

    /// File name for the saved copy
    pub save_name: Option<String>,
}

/// A voice preset advertised by the backend
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    voices: Vec<VoiceInfo>,
}

/// A character preset advertised by the backend
///
/// The system prompt fragment is spliced into the chat conversation by the
/// session; the associated voice, when present, becomes the queue's voice.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub voice: Option<String>,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
struct CharactersResponse {
    characters: Vec<Character>,
}

/// Liveness/version probe response
#[derive(Clone, Debug, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: String,
}

/// HTTP client for the TTS backend
#[derive(Clone, Debug)]
pub struct TTSClient {
    http: reqwest::Client,
}

impl TTSClient {
    /// Create a new client
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ReciteError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }

    /// Synthesize a fragment with the given configuration snapshot
    pub async fn synthesize(&self, text: &str, config: &TTSConfig) -> Result<Bytes> {
        self.synthesize_with(text, config, &SaveOptions::default())
            .await
    }

    /// Synthesize with server-side save options
    pub async fn synthesize_with(
        &self,
        text: &str,
        config: &TTSConfig,
        save: &SaveOptions,
    ) -> Result<Bytes> {
        let url = format!("{}/v1/audio/speech", config.base_url.trim_end_matches('/'));
        let request = TTSRequest::new(text, config, save);

        debug!("Synthesizing {} chars via {}", text.chars().count(), url);

        let response = self
            .http
            .post(&url)
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ReciteError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        response.bytes().await.map_err(network_error)
    }

    /// List the voice presets the backend offers
    pub async fn fetch_voices(&self, base_url: &str) -> Result<Vec<VoiceInfo>> {
        let url = format!("{}/v1/voices", base_url.trim_end_matches('/'));
        let response: VoicesResponse = self.get_json(&url).await?;
        Ok(response.voices)
    }

    /// List the character presets the backend offers
    pub async fn fetch_characters(&self, base_url: &str) -> Result<Vec<Character>> {
        let url = format!("{}/v1/characters", base_url.trim_end_matches('/'));
        let response: CharactersResponse = self.get_json(&url).await?;
        Ok(response.characters)
    }

    /// Probe the backend for liveness and version info
    pub async fn probe(&self, base_url: &str) -> Result<ServerInfo> {
        let url = format!("{}/", base_url.trim_end_matches('/'));
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await.map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ReciteError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ReciteError::NetworkError(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl Synthesizer for TTSClient {
    async fn synthesize(&self, text: &str, config: &TTSConfig) -> Result<Bytes> {
        TTSClient::synthesize(self, text, config).await
    }
}

fn network_error(e: reqwest::Error) -> ReciteError {
    if e.is_timeout() {
        ReciteError::NetworkError(format!("request timed out: {e}"))
    } else {
        ReciteError::NetworkError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_carries_all_sampling_parameters() {
        let config = TTSConfig::default().with_voice("mira").with_emotion("happy");
        let request = TTSRequest::new("hello", &config, &SaveOptions::default());
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["input"], "hello");
        assert_eq!(body["voice"], "mira");
        assert_eq!(body["emotion"], "happy");
        assert_eq!(body["speed"], 1.0);
        assert_eq!(body["top_k"], 20);
        assert_eq!(body["response_format"], "wav");
        assert!(body.get("save_audio").is_none());
        assert!(body.get("save_name").is_none());
    }

    #[test]
    fn test_request_body_includes_save_options_when_set() {
        let save = SaveOptions {
            save_audio: true,
            save_name: Some("clip.wav".to_string()),
        };
        let request = TTSRequest::new("hello", &TTSConfig::default(), &save);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["save_audio"], true);
        assert_eq!(body["save_name"], "clip.wav");
    }

    #[test]
    fn test_voice_description_is_optional() {
        let voices: VoicesResponse = serde_json::from_str(
            r#"{"voices": [{"id": "a", "name": "A"}, {"id": "b", "name": "B", "description": "deep"}]}"#,
        )
        .unwrap();

        assert_eq!(voices.voices[0].description, None);
        assert_eq!(voices.voices[1].description.as_deref(), Some("deep"));
    }
}
