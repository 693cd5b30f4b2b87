//! Conversation history management for the chat session
//!
//! Keeps the system prompt and a bounded message history, formatted the way
//! the chat completions API expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant response
    Assistant,
}

impl MessageRole {
    /// Convert to the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single message in the conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,

    /// Message content
    pub content: String,

    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Manages the conversation history sent with each chat request
#[derive(Clone, Debug)]
pub struct ConversationContext {
    /// System prompt (always included first)
    system_prompt: String,

    /// Conversation history
    messages: Vec<ChatMessage>,

    /// Maximum number of messages to keep
    max_messages: usize,
}

impl ConversationContext {
    /// Create a new conversation context
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
            max_messages: 100,
        }
    }

    /// Set the maximum number of messages to keep
    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    /// Get the system prompt
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Update the system prompt
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    /// Add a user message to the conversation
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.add_message(ChatMessage::user(content));
    }

    /// Add an assistant message to the conversation
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.add_message(ChatMessage::assistant(content));
    }

    fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.trim_to_fit();
    }

    /// Get all messages including the system prompt
    pub fn get_messages(&self) -> Vec<ChatMessage> {
        let mut result = vec![ChatMessage::system(self.system_prompt.clone())];
        result.extend(self.messages.clone());
        result
    }

    /// Get only the conversation messages (without the system prompt)
    pub fn get_history(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Get the last assistant message
    pub fn last_assistant_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }

    /// Clear conversation history (the system prompt is kept)
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get the number of messages in history
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn trim_to_fit(&mut self) {
        while self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ChatMessage::user("Hello, world!");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, "Hello, world!");
    }

    #[test]
    fn test_add_messages() {
        let mut ctx = ConversationContext::new("System prompt");

        ctx.add_user_message("Hello");
        ctx.add_assistant_message("Hi there!");
        assert_eq!(ctx.message_count(), 2);

        let messages = ctx.get_messages();
        assert_eq!(messages.len(), 3); // System + 2 messages
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(messages[2].role, MessageRole::Assistant);
    }

    #[test]
    fn test_message_limiting() {
        let mut ctx = ConversationContext::new("Sys").with_max_messages(4);

        for i in 0..20 {
            ctx.add_user_message(format!("Message {}", i));
        }

        assert_eq!(ctx.message_count(), 4);
        assert_eq!(ctx.get_history()[0].content, "Message 16");
    }

    #[test]
    fn test_clear_keeps_system_prompt() {
        let mut ctx = ConversationContext::new("System");
        ctx.add_user_message("Hello");
        ctx.add_assistant_message("Hi");

        ctx.clear();

        assert_eq!(ctx.message_count(), 0);
        assert_eq!(ctx.system_prompt(), "System");
    }

    #[test]
    fn test_last_assistant_message() {
        let mut ctx = ConversationContext::new("System");
        ctx.add_user_message("User 1");
        ctx.add_assistant_message("Assistant 1");
        ctx.add_user_message("User 2");

        let last = ctx.last_assistant_message().unwrap();
        assert_eq!(last.content, "Assistant 1");
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(MessageRole::System.as_str(), "system");
        assert_eq!(MessageRole::User.as_str(), "user");
        assert_eq!(MessageRole::Assistant.as_str(), "assistant");
    }
}
