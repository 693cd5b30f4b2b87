//! Application configuration
//!
//! Combines the chat and TTS settings and validates them before any network
//! activity, so misconfiguration surfaces up front instead of as a silent
//! stream of failed fragments.

use crate::llm::LLMConfig;
use crate::speech::TTSConfig;
use crate::{ReciteError, Result};
use std::env;

/// Configuration for a full chat-and-speak session
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Chat backend configuration
    pub llm: LLMConfig,

    /// TTS backend configuration
    pub tts: TTSConfig,

    /// Whether to play audio at all (a silent output is used when false)
    pub enable_audio_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            tts: TTSConfig::default(),
            enable_audio_output: true,
        }
    }
}

impl AppConfig {
    /// Set the chat backend configuration
    pub fn with_llm(mut self, llm: LLMConfig) -> Self {
        self.llm = llm;
        self
    }

    /// Set the TTS backend configuration
    pub fn with_tts(mut self, tts: TTSConfig) -> Self {
        self.tts = tts;
        self
    }

    /// Disable audio output (text-only mode)
    pub fn without_audio_output(mut self) -> Self {
        self.enable_audio_output = false;
        self
    }

    /// Read configuration from `RECITE_*` environment variables, keeping
    /// the defaults for anything unset
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("RECITE_LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(key) = env::var("RECITE_LLM_API_KEY") {
            config.llm.api_key = key;
        }
        if let Ok(model) = env::var("RECITE_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(url) = env::var("RECITE_TTS_BASE_URL") {
            config.tts.base_url = url;
        }
        if let Ok(voice) = env::var("RECITE_TTS_VOICE") {
            config.tts.voice = voice;
        }
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.trim().is_empty() {
            return Err(ReciteError::ConfigError("LLM base URL is required".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ReciteError::ConfigError("LLM model is required".into()));
        }
        if self.tts.base_url.trim().is_empty() {
            return Err(ReciteError::ConfigError("TTS base URL is required".into()));
        }
        if self.tts.voice.trim().is_empty() {
            return Err(ReciteError::ConfigError("TTS voice is required".into()));
        }
        Ok(())
    }
}
