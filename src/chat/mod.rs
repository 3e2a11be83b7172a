//! Shopping assistant chat
//!
//! A transcript-keeping widget in front of a streaming language-model
//! session. The model side sits behind the [`Assistant`] and
//! [`AssistantSession`] traits; [`GeminiAssistant`] talks to the Gemini
//! `streamGenerateContent` endpoint.

mod gemini;
mod message;
mod widget;

pub use gemini::{GeminiAssistant, GeminiSession};
pub use message::{ChatMessage, ChatRole};
pub use widget::{ChatWidget, SendOutcome};

use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Instruction given to every new assistant session
pub const SYSTEM_PROMPT: &str = "You are a friendly and knowledgeable assistant for Laptop Store Deluxe. \
Help users find laptops, answer questions about specifications, and provide information about our store. \
Be concise and helpful. If you are asked about topics completely unrelated to laptops, technology, or \
customer service for an electronics store, politely state that you are specialized in assisting with \
laptop purchases and related queries.";

/// First model entry of a new transcript
pub const GREETING: &str = "Hello! I'm your Laptop Assistant. How can I help you today?";

/// Model entry appended when a reply fails
pub const ERROR_REPLY: &str = "Sorry, I encountered an issue. Please try again.";

/// Trailing glyph on a reply that is still streaming
pub const CURSOR: &str = "▍";

pub(crate) const CONFIG_ERROR_MESSAGE: &str = "Chatbot configuration error. API key missing.";
pub(crate) const CONNECT_ERROR_MESSAGE: &str =
    "Could not connect to the chat assistant. Please try again later.";

/// Text fragments of one streamed reply, in arrival order.
///
/// The stream ends when the reply is complete; an `Err` item ends it early.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, AssistantError>> + Send>>;

/// Errors from the assistant backend
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Assistant API key is not configured")]
    MissingApiKey,

    #[error("Assistant API key is malformed")]
    InvalidApiKey,

    #[error("Assistant request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Assistant API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Assistant stream failed: {0}")]
    Stream(String),

    #[error("Failed to decode assistant response: {0}")]
    Decode(String),
}

impl AssistantError {
    /// Credential problems, which no retry will fix
    pub fn is_configuration(&self) -> bool {
        matches!(self, AssistantError::MissingApiKey | AssistantError::InvalidApiKey)
    }
}

/// Factory for assistant sessions
pub trait Assistant: Send + Sync {
    /// Open a new conversation. Fails without any network call when the
    /// credential is missing or malformed.
    fn start_session(&self, system_prompt: &str) -> Result<Box<dyn AssistantSession>, AssistantError>;
}

/// One conversation; remembers the turns that completed successfully
#[async_trait]
pub trait AssistantSession: Send {
    async fn send_message_stream(&mut self, text: &str) -> Result<FragmentStream, AssistantError>;
}
