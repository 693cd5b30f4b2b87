pub mod audio;
pub mod integration;
pub mod llm;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ReciteError {
    #[error("Speech service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Speech network error: {0}")]
    NetworkError(String),

    #[error("Chat stream error: {0}")]
    ChatError(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ReciteError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The backend may answer the next request even after refusing one
            ReciteError::ServiceError { .. } => true,
            ReciteError::NetworkError(_) => true,
            ReciteError::ChatError(_) => true,
            ReciteError::PlaybackError(_) => true,
            // Misconfiguration requires user intervention
            ReciteError::ConfigError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReciteError>;
