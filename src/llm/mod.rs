//! Streaming chat backend: configuration, conversation state, the SSE
//! client, and quoted-dialogue extraction from the reply stream.

pub mod config;
pub mod context;
pub mod prompts;
pub mod quotes;
pub mod stream;

pub use config::LLMConfig;
pub use context::{ChatMessage, ConversationContext, MessageRole};
pub use quotes::{QuoteExtractor, QuoteTracker};
pub use stream::LLMClient;
