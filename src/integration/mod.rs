//! Wiring between the chat stream, quote extraction, and the playback queue

pub mod config;
pub mod session;

pub use config::AppConfig;
pub use session::ChatSession;
