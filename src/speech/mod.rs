//! Speech synthesis and ordered playback

pub mod client;
pub mod config;
pub mod queue;

pub use client::{Character, SaveOptions, ServerInfo, TTSClient, VoiceInfo};
pub use config::{ResponseFormat, TTSConfig};
pub use queue::{Fragment, FragmentStatus, PlaybackQueue, QueueEvent};

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Converts a text fragment into audio bytes
///
/// The playback queue talks to the TTS backend through this trait so tests
/// can substitute a stub for the network client.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` using the given configuration snapshot
    async fn synthesize(&self, text: &str, config: &TTSConfig) -> Result<Bytes>;
}
