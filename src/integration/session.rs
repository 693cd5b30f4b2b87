//! Chat session that speaks quoted dialogue as the reply streams in

use crate::integration::config::AppConfig;
use crate::llm::prompts::build_system_prompt;
use crate::llm::{ChatMessage, ConversationContext, LLMClient, LLMConfig, QuoteTracker};
use crate::speech::client::Character;
use crate::speech::PlaybackQueue;
use crate::Result;
use futures::{pin_mut, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Drives one conversation: streams replies from the chat backend, extracts
/// newly completed quotes chunk by chunk, and hands them to the playback
/// queue in discovery order.
pub struct ChatSession {
    llm_config: LLMConfig,
    client: LLMClient,
    context: ConversationContext,
    tracker: QuoteTracker,
    queue: Arc<PlaybackQueue>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession").finish_non_exhaustive()
    }
}

impl ChatSession {
    /// Create a session; fails fast on invalid configuration
    pub fn new(config: &AppConfig, queue: Arc<PlaybackQueue>) -> Result<Self> {
        config.validate()?;
        let client = LLMClient::new(&config.llm)?;

        Ok(Self {
            llm_config: config.llm.clone(),
            client,
            context: ConversationContext::new(build_system_prompt(None)),
            tracker: QuoteTracker::new(),
            queue,
        })
    }

    /// Send one user turn, returning the full assistant reply once the
    /// stream ends
    ///
    /// Quotes are enqueued for playback as soon as their closing delimiter
    /// streams in, while the rest of the reply is still being generated.
    pub async fn send(&mut self, user_text: &str) -> Result<String> {
        let turn_id = Uuid::new_v4();
        debug!("Chat turn {} started", turn_id);

        self.tracker.reset();
        self.context.add_user_message(user_text);

        let messages = self.context.get_messages();
        let stream = self.client.stream_chat(&self.llm_config, &messages);
        pin_mut!(stream);

        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            reply.push_str(&chunk);
            for quote in self.tracker.push(&chunk) {
                debug!("Turn {}: speaking \"{}\"", turn_id, quote);
                self.queue.enqueue(quote);
            }
        }

        info!("Chat turn {} complete ({} chars)", turn_id, reply.len());
        self.context.add_assistant_message(&reply);
        Ok(reply)
    }

    /// Switch to a character preset: splice its prompt into the system
    /// prompt and adopt its voice for fragments not yet synthesized
    pub fn apply_character(&mut self, character: &Character) {
        info!("Applying character preset: {}", character.name);
        self.context
            .set_system_prompt(build_system_prompt(Some(&character.system_prompt)));

        if let Some(voice) = &character.voice {
            let config = self.queue.config().with_voice(voice.clone());
            self.queue.update_config(config);
        }
    }

    /// Stop any speech currently playing or queued
    pub fn stop_speaking(&self) {
        self.queue.stop();
    }

    /// Clear conversation history (the system prompt is kept)
    pub fn clear(&mut self) {
        self.context.clear();
    }

    /// Conversation history so far
    pub fn history(&self) -> &[ChatMessage] {
        self.context.get_history()
    }

    /// The playback queue this session speaks through
    pub fn queue(&self) -> &Arc<PlaybackQueue> {
        &self.queue
    }
}
