//! Configuration for speech synthesis
//!
//! The playback queue takes a value snapshot of this configuration each time
//! a fragment begins synthesis, so edits apply to fragments not yet
//! synthesized and never to calls already in flight.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default TTS backend address
pub const DEFAULT_TTS_BASE_URL: &str = "http://localhost:8000";

/// Default network timeout for a single synthesis call
pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Audio container format returned by the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Wav,
    Mp3,
}

impl ResponseFormat {
    /// The wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Wav => "wav",
            ResponseFormat::Mp3 => "mp3",
        }
    }
}

/// Configuration for speech synthesis requests
#[derive(Clone, Debug, PartialEq)]
pub struct TTSConfig {
    /// Base URL of the TTS backend
    pub base_url: String,

    /// Voice preset id
    pub voice: String,

    /// Emotion tag ("auto" lets the backend infer it from the text)
    pub emotion: String,

    /// Speech rate (1.0 = normal)
    pub speed: f32,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling threshold
    pub top_p: f32,

    /// Top-k sampling cutoff
    pub top_k: u32,

    /// Repetition penalty
    pub repetition_penalty: f32,

    /// Audio format to request
    pub response_format: ResponseFormat,

    /// Network timeout for a single synthesis call
    pub timeout: Duration,
}

impl Default for TTSConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TTS_BASE_URL.to_string(),
            voice: "default".to_string(),
            emotion: "default".to_string(),
            speed: 1.0,
            temperature: 0.3,
            top_p: 0.7,
            top_k: 20,
            repetition_penalty: 1.2,
            response_format: ResponseFormat::Wav,
            timeout: DEFAULT_SYNTHESIS_TIMEOUT,
        }
    }
}

impl TTSConfig {
    /// Create a configuration for the given backend
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the voice preset
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the emotion tag
    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = emotion.into();
        self
    }

    /// Set the speech rate
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the audio format
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Set the synthesis network timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TTSConfig::default();
        assert_eq!(config.base_url, DEFAULT_TTS_BASE_URL);
        assert_eq!(config.voice, "default");
        assert_eq!(config.response_format, ResponseFormat::Wav);
        assert_eq!(config.timeout, DEFAULT_SYNTHESIS_TIMEOUT);
    }

    #[test]
    fn test_builder() {
        let config = TTSConfig::new("http://tts.local")
            .with_voice("mira")
            .with_emotion("happy")
            .with_speed(1.5)
            .with_response_format(ResponseFormat::Mp3)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://tts.local");
        assert_eq!(config.voice, "mira");
        assert_eq!(config.emotion, "happy");
        assert!((config.speed - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.response_format, ResponseFormat::Mp3);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_response_format_wire_names() {
        assert_eq!(ResponseFormat::Wav.as_str(), "wav");
        assert_eq!(ResponseFormat::Mp3.as_str(), "mp3");
    }
}
