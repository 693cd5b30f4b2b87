//! Ordered speech playback queue
//!
//! Fragments are synthesized and played strictly in the order they were
//! enqueued, one at a time. A single pump task drives the head of the queue
//! through synthesis and playback; enqueue calls while the pump is running
//! only append. A failed fragment is reported, dropped, and the pump moves
//! on, so one bad utterance never stalls the rest of the reply.

use crate::audio::AudioOutput;
use crate::speech::config::TTSConfig;
use crate::speech::Synthesizer;
use bytes::Bytes;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Lifecycle state of a queued fragment
///
/// Transitions run strictly forward; `Failed` is terminal. A fragment leaves
/// the queue as soon as it reaches `Completed` or `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentStatus {
    Pending,
    Synthesizing,
    Ready,
    Playing,
    Completed,
    Failed,
}

/// One speakable unit of text moving through synthesis and playback
#[derive(Clone, Debug)]
pub struct Fragment {
    pub id: Uuid,
    pub text: String,
    pub status: FragmentStatus,
    pub audio: Option<Bytes>,
}

impl Fragment {
    fn new(text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            status: FragmentStatus::Pending,
            audio: None,
        }
    }
}

/// Events emitted by the queue
///
/// Failures are reported here (and logged) rather than raised, so a missing
/// utterance is diagnosable without interrupting the streaming session.
#[derive(Clone, Debug)]
pub enum QueueEvent {
    /// A fragment began playing
    PlaybackStarted { id: Uuid, text: String },

    /// A fragment finished playing and left the queue
    PlaybackFinished { id: Uuid },

    /// Synthesis failed; the fragment was dropped and the queue continued
    SynthesisFailed { id: Uuid, text: String, error: String },

    /// Playback failed; the fragment was dropped and the queue continued
    PlaybackFailed { id: Uuid, text: String, error: String },

    /// The queue drained and the pump went idle
    Idle,

    /// The queue was stopped and cleared
    Stopped,
}

struct QueueState {
    fragments: VecDeque<Fragment>,
    pump_active: bool,
    /// Bumped by `stop()`; a pump only touches state while its generation
    /// matches, so a stale pump can never resurrect a cleared queue.
    generation: u64,
}

/// FIFO playback queue over a synthesizer and an audio output
///
/// The queue does not deduplicate fragments; duplicate suppression belongs
/// to the caller (see [`crate::llm::QuoteTracker`]).
pub struct PlaybackQueue {
    state: Arc<Mutex<QueueState>>,
    config: Arc<Mutex<TTSConfig>>,
    synthesizer: Arc<dyn Synthesizer>,
    output: Arc<dyn AudioOutput>,
    event_tx: Sender<QueueEvent>,
    event_rx: Receiver<QueueEvent>,
}

impl PlaybackQueue {
    /// Create an idle queue
    pub fn new(
        synthesizer: Arc<dyn Synthesizer>,
        output: Arc<dyn AudioOutput>,
        config: TTSConfig,
    ) -> Self {
        let (event_tx, event_rx) = bounded(256);

        Self {
            state: Arc::new(Mutex::new(QueueState {
                fragments: VecDeque::new(),
                pump_active: false,
                generation: 0,
            })),
            config: Arc::new(Mutex::new(config)),
            synthesizer,
            output,
            event_tx,
            event_rx,
        }
    }

    /// Append a fragment and start the pump if it is not already running
    ///
    /// Never blocks; must be called from within a tokio runtime. The text is
    /// trimmed and ignored when empty.
    pub fn enqueue(&self, text: impl Into<String>) {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return;
        }

        let mut state = self.state.lock();
        let fragment = Fragment::new(text);
        debug!(
            "Enqueued fragment {} ({} queued)",
            fragment.id,
            state.fragments.len() + 1
        );
        state.fragments.push_back(fragment);

        if !state.pump_active {
            state.pump_active = true;
            let generation = state.generation;
            drop(state);
            self.spawn_pump(generation);
        }
    }

    /// Replace the configuration used for fragments not yet synthesized
    ///
    /// Safe to call at any time; a synthesis call already in flight keeps
    /// the snapshot it was started with.
    pub fn update_config(&self, config: TTSConfig) {
        *self.config.lock() = config;
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> TTSConfig {
        self.config.lock().clone()
    }

    /// Stop playback immediately, discard every queued fragment, and reset
    /// to idle
    ///
    /// Safe to call when already idle. A subsequent `enqueue` starts a
    /// clean run.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock();
            state.generation += 1;
            state.fragments.clear();
            state.pump_active = false;
        }
        self.output.stop();
        let _ = self.event_tx.try_send(QueueEvent::Stopped);
        debug!("Playback queue stopped");
    }

    /// Number of fragments not yet completed or failed
    pub fn queue_length(&self) -> usize {
        self.state.lock().fragments.len()
    }

    /// Whether the pump is idle (nothing queued or playing)
    pub fn is_idle(&self) -> bool {
        !self.state.lock().pump_active
    }

    /// Text of the fragment currently playing, if any
    pub fn now_playing(&self) -> Option<String> {
        let state = self.state.lock();
        state
            .fragments
            .front()
            .filter(|f| f.status == FragmentStatus::Playing)
            .map(|f| f.text.clone())
    }

    /// Receiver for queue events
    pub fn event_receiver(&self) -> Receiver<QueueEvent> {
        self.event_rx.clone()
    }

    fn spawn_pump(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let config = Arc::clone(&self.config);
        let synthesizer = Arc::clone(&self.synthesizer);
        let output = Arc::clone(&self.output);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            pump(state, config, synthesizer, output, event_tx, generation).await;
        });
    }
}

/// Sequential processing loop: drives the head fragment through synthesis
/// and playback until the queue drains or the generation is invalidated by
/// `stop()`.
async fn pump(
    state: Arc<Mutex<QueueState>>,
    config: Arc<Mutex<TTSConfig>>,
    synthesizer: Arc<dyn Synthesizer>,
    output: Arc<dyn AudioOutput>,
    event_tx: Sender<QueueEvent>,
    generation: u64,
) {
    loop {
        // Claim the head fragment for synthesis.
        let (id, text) = {
            let mut state = state.lock();
            if state.generation != generation {
                return;
            }
            match state.fragments.front_mut() {
                None => {
                    state.pump_active = false;
                    let _ = event_tx.try_send(QueueEvent::Idle);
                    debug!("Playback queue idle");
                    return;
                }
                Some(fragment) => {
                    fragment.status = FragmentStatus::Synthesizing;
                    (fragment.id, fragment.text.clone())
                }
            }
        };

        // Snapshot the configuration at the moment synthesis starts;
        // concurrent update_config calls only affect later fragments.
        let snapshot = config.lock().clone();

        let audio = match synthesizer.synthesize(&text, &snapshot).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!("Synthesis failed for fragment {}: {}", id, e);
                let _ = event_tx.try_send(QueueEvent::SynthesisFailed {
                    id,
                    text,
                    error: e.to_string(),
                });
                let mut state = state.lock();
                if state.generation != generation {
                    return;
                }
                if let Some(fragment) = state.fragments.front_mut() {
                    if fragment.id == id {
                        fragment.status = FragmentStatus::Failed;
                        state.fragments.pop_front();
                    }
                }
                continue;
            }
        };

        {
            let mut state = state.lock();
            if state.generation != generation {
                return;
            }
            match state.fragments.front_mut() {
                Some(fragment) if fragment.id == id => {
                    fragment.audio = Some(audio.clone());
                    fragment.status = FragmentStatus::Ready;
                }
                _ => continue,
            }
        }

        {
            let mut state = state.lock();
            if state.generation != generation {
                return;
            }
            match state.fragments.front_mut() {
                Some(fragment) if fragment.id == id => {
                    fragment.status = FragmentStatus::Playing;
                }
                _ => continue,
            }
        }

        let _ = event_tx.try_send(QueueEvent::PlaybackStarted {
            id,
            text: text.clone(),
        });

        let result = output.play(audio).await;

        let mut state_guard = state.lock();
        if state_guard.generation != generation {
            // Stopped during playback; stop() already cleared the list.
            return;
        }
        match result {
            Ok(()) => {
                if let Some(fragment) = state_guard.fragments.front_mut() {
                    if fragment.id == id {
                        fragment.status = FragmentStatus::Completed;
                        state_guard.fragments.pop_front();
                    }
                }
                drop(state_guard);
                let _ = event_tx.try_send(QueueEvent::PlaybackFinished { id });
            }
            Err(e) => {
                warn!("Playback failed for fragment {}: {}", id, e);
                if let Some(fragment) = state_guard.fragments.front_mut() {
                    if fragment.id == id {
                        fragment.status = FragmentStatus::Failed;
                        state_guard.fragments.pop_front();
                    }
                }
                drop(state_guard);
                let _ = event_tx.try_send(QueueEvent::PlaybackFailed {
                    id,
                    text,
                    error: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullOutput;
    use crate::Result;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticSynth;

    #[async_trait]
    impl Synthesizer for StaticSynth {
        async fn synthesize(&self, text: &str, _config: &TTSConfig) -> Result<Bytes> {
            Ok(Bytes::from(text.as_bytes().to_vec()))
        }
    }

    fn test_queue() -> PlaybackQueue {
        PlaybackQueue::new(
            Arc::new(StaticSynth),
            Arc::new(NullOutput),
            TTSConfig::default(),
        )
    }

    async fn wait_for_idle(queue: &PlaybackQueue) {
        for _ in 0..200 {
            if queue.is_idle() && queue.queue_length() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("queue did not drain in time");
    }

    #[tokio::test]
    async fn test_drains_to_idle() {
        let queue = test_queue();
        queue.enqueue("hello");
        queue.enqueue("world");

        wait_for_idle(&queue).await;
        assert!(queue.now_playing().is_none());
    }

    #[tokio::test]
    async fn test_empty_text_is_ignored() {
        let queue = test_queue();
        queue.enqueue("   ");
        assert_eq!(queue.queue_length(), 0);
        assert!(queue.is_idle());
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let queue = test_queue();
        queue.stop();
        assert!(queue.is_idle());

        queue.enqueue("after stop");
        wait_for_idle(&queue).await;
    }

    #[tokio::test]
    async fn test_events_report_playback() {
        let queue = test_queue();
        let events = queue.event_receiver();

        queue.enqueue("hello");
        wait_for_idle(&queue).await;

        let mut started = false;
        let mut finished = false;
        let mut idle = false;
        while let Ok(event) = events.try_recv() {
            match event {
                QueueEvent::PlaybackStarted { text, .. } => {
                    assert_eq!(text, "hello");
                    started = true;
                }
                QueueEvent::PlaybackFinished { .. } => finished = true,
                QueueEvent::Idle => idle = true,
                _ => {}
            }
        }
        assert!(started && finished && idle);
    }

    #[test]
    fn test_config_snapshot_roundtrip() {
        let queue = test_queue();
        queue.update_config(TTSConfig::default().with_voice("alto"));
        assert_eq!(queue.config().voice, "alto");
    }
}
