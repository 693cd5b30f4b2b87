//! Audio output boundary
//!
//! The playback queue plays clips through the `AudioOutput` trait; the
//! default implementation drives a rodio sink on a dedicated thread.

#[cfg(feature = "audio-io")]
pub mod output;

#[cfg(feature = "audio-io")]
pub use output::RodioOutput;

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// A device that plays one audio clip at a time
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Play a clip, resolving when playback ends naturally or is stopped
    ///
    /// Decode and device failures resolve the call with an error; `play`
    /// never leaves the caller waiting on a clip that will not finish.
    async fn play(&self, audio: Bytes) -> Result<()>;

    /// Halt the currently playing clip immediately. No-op when idle.
    fn stop(&self);
}

/// Output that discards audio, for headless use and tests
pub struct NullOutput;

#[async_trait]
impl AudioOutput for NullOutput {
    async fn play(&self, _audio: Bytes) -> Result<()> {
        Ok(())
    }

    fn stop(&self) {}
}

/// Open the default audio device, falling back to a silent output when no
/// device is available
#[cfg(feature = "audio-io")]
pub fn default_output() -> Arc<dyn AudioOutput> {
    match RodioOutput::new() {
        Ok(output) => Arc::new(output),
        Err(e) => {
            tracing::warn!("Audio output unavailable, continuing silent: {}", e);
            Arc::new(NullOutput)
        }
    }
}

/// Silent output; playback support is compiled out
#[cfg(not(feature = "audio-io"))]
pub fn default_output() -> Arc<dyn AudioOutput> {
    Arc::new(NullOutput)
}
