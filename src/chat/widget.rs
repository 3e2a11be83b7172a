//! Chat widget state
//!
//! Owns the transcript, the open/closed toggle and the live assistant
//! session. A reply streams into a single placeholder entry that shows the
//! cursor glyph until the stream ends.

use futures_util::StreamExt;
use std::sync::Arc;

use super::{
    Assistant, AssistantError, AssistantSession, ChatMessage, CONFIG_ERROR_MESSAGE,
    CONNECT_ERROR_MESSAGE, CURSOR, ERROR_REPLY, GREETING, SYSTEM_PROMPT,
};

/// Result of a send attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent: blank input, a reply already streaming, or no session
    Ignored,
    /// The reply streamed to the end
    Completed,
    /// The reply failed; the error reply was appended to the transcript
    Failed(String),
}

pub struct ChatWidget {
    assistant: Arc<dyn Assistant>,
    session: Option<Box<dyn AssistantSession>>,
    messages: Vec<ChatMessage>,
    is_open: bool,
    is_streaming: bool,
    error: Option<String>,
    /// Credential problem; input stays disabled until the widget reopens
    config_error: bool,
}

impl ChatWidget {
    pub fn new(assistant: Arc<dyn Assistant>) -> Self {
        Self {
            assistant,
            session: None,
            messages: Vec::new(),
            is_open: false,
            is_streaming: false,
            error: None,
            config_error: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the input box accepts text at all
    pub fn input_enabled(&self) -> bool {
        self.is_open && self.session.is_some() && !self.config_error && !self.is_streaming
    }

    pub fn can_send(&self, input: &str) -> bool {
        self.input_enabled() && !input.trim().is_empty()
    }

    pub fn toggle(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Show the widget and start a fresh session with the greeting
    pub fn open(&mut self) {
        if self.is_open {
            return;
        }
        self.is_open = true;
        self.messages.clear();
        self.error = None;
        self.config_error = false;

        match self.assistant.start_session(SYSTEM_PROMPT) {
            Ok(session) => {
                self.session = Some(session);
                self.messages.push(ChatMessage::model(GREETING));
            }
            Err(e) if e.is_configuration() => {
                tracing::error!("Assistant is not configured: {}", e);
                self.config_error = true;
                self.error = Some(CONFIG_ERROR_MESSAGE.to_string());
            }
            Err(e) => {
                tracing::error!("Failed to start assistant session: {}", e);
                self.error = Some(CONNECT_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Hide the widget, dropping the session and transcript
    pub fn close(&mut self) {
        self.is_open = false;
        self.session = None;
        self.messages.clear();
        self.is_streaming = false;
        self.error = None;
        self.config_error = false;
    }

    /// Send a message and stream the reply into the transcript.
    ///
    /// `on_update` sees the model entry after every fragment, with the
    /// cursor glyph appended.
    pub async fn send<F>(&mut self, input: &str, mut on_update: F) -> SendOutcome
    where
        F: FnMut(&ChatMessage),
    {
        if !self.can_send(input) {
            return SendOutcome::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return SendOutcome::Ignored;
        };

        self.messages.push(ChatMessage::user(input));
        self.error = None;
        self.is_streaming = true;

        let result = stream_reply(session.as_mut(), input, &mut self.messages, &mut on_update).await;
        self.is_streaming = false;

        match result {
            Ok(()) => SendOutcome::Completed,
            Err(e) => {
                tracing::warn!("Assistant reply failed: {}", e);
                self.messages.push(ChatMessage::model(ERROR_REPLY));
                self.error = Some(ERROR_REPLY.to_string());
                SendOutcome::Failed(e.to_string())
            }
        }
    }
}

async fn stream_reply<F>(
    session: &mut dyn AssistantSession,
    input: &str,
    messages: &mut Vec<ChatMessage>,
    on_update: &mut F,
) -> Result<(), AssistantError>
where
    F: FnMut(&ChatMessage),
{
    let mut stream = session.send_message_stream(input).await?;

    messages.push(ChatMessage::model(CURSOR));
    let index = messages.len() - 1;
    on_update(&messages[index]);

    let mut accumulated = String::new();
    while let Some(fragment) = stream.next().await {
        match fragment {
            Ok(fragment) => {
                accumulated.push_str(&fragment);
                messages[index].text = format!("{}{}", accumulated, CURSOR);
                on_update(&messages[index]);
            }
            Err(e) => {
                // Keep what arrived; an empty placeholder is dropped
                if accumulated.trim().is_empty() {
                    messages.remove(index);
                } else {
                    messages[index].text = accumulated.trim().to_string();
                }
                return Err(e);
            }
        }
    }

    messages[index].text = accumulated.trim().to_string();
    on_update(&messages[index]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatRole, FragmentStream};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with canned fragments and records what it was sent
    struct ScriptedAssistant {
        script: Vec<Result<String, String>>,
        fail_send: bool,
        missing_key: bool,
        sent: Arc<Mutex<Vec<String>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedAssistant {
        fn replying(fragments: &[&str]) -> Self {
            Self {
                script: fragments.iter().map(|f| Ok(f.to_string())).collect(),
                fail_send: false,
                missing_key: false,
                sent: Arc::new(Mutex::new(Vec::new())),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    struct ScriptedSession {
        script: Vec<Result<String, String>>,
        fail_send: bool,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl Assistant for ScriptedAssistant {
        fn start_session(&self, system_prompt: &str) -> Result<Box<dyn AssistantSession>, AssistantError> {
            if self.missing_key {
                return Err(AssistantError::MissingApiKey);
            }
            self.prompts.lock().unwrap().push(system_prompt.to_string());
            Ok(Box::new(ScriptedSession {
                script: self.script.clone(),
                fail_send: self.fail_send,
                sent: Arc::clone(&self.sent),
            }))
        }
    }

    #[async_trait]
    impl AssistantSession for ScriptedSession {
        async fn send_message_stream(&mut self, text: &str) -> Result<FragmentStream, AssistantError> {
            self.sent.lock().unwrap().push(text.to_string());
            if self.fail_send {
                return Err(AssistantError::Stream("connection reset".to_string()));
            }
            let items: Vec<Result<String, AssistantError>> = self
                .script
                .iter()
                .map(|item| item.clone().map_err(AssistantError::Stream))
                .collect();
            Ok(Box::pin(futures_util::stream::iter(items)))
        }
    }

    fn widget(assistant: ScriptedAssistant) -> ChatWidget {
        let mut widget = ChatWidget::new(Arc::new(assistant));
        widget.open();
        widget
    }

    #[test]
    fn test_open_greets_with_system_prompt() {
        let assistant = ScriptedAssistant::replying(&[]);
        let prompts = Arc::clone(&assistant.prompts);
        let widget = widget(assistant);

        assert!(widget.is_open());
        assert!(widget.input_enabled());
        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.messages()[0].role, ChatRole::Model);
        assert_eq!(widget.messages()[0].text, GREETING);
        assert_eq!(prompts.lock().unwrap().as_slice(), [SYSTEM_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn test_missing_key_disables_input() {
        let mut assistant = ScriptedAssistant::replying(&["never"]);
        assistant.missing_key = true;
        let sent = Arc::clone(&assistant.sent);
        let mut widget = widget(assistant);

        assert!(widget.messages().is_empty());
        assert_eq!(widget.error(), Some(CONFIG_ERROR_MESSAGE));
        assert!(!widget.input_enabled());

        let outcome = widget.send("hello", |_| {}).await;
        assert_eq!(outcome, SendOutcome::Ignored);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reply_streams_into_one_entry() {
        let assistant = ScriptedAssistant::replying(&["The ", "MacBook Air ", "is great.\n"]);
        let sent = Arc::clone(&assistant.sent);
        let mut widget = widget(assistant);

        let mut updates = Vec::new();
        let outcome = widget
            .send("Light laptop?", |message| updates.push(message.text.clone()))
            .await;

        assert_eq!(outcome, SendOutcome::Completed);
        assert_eq!(sent.lock().unwrap().as_slice(), ["Light laptop?".to_string()]);
        assert_eq!(
            updates,
            vec![
                "▍",
                "The ▍",
                "The MacBook Air ▍",
                "The MacBook Air is great.\n▍",
                "The MacBook Air is great.",
            ]
        );

        let messages = widget.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[1].is_user());
        assert_eq!(messages[1].text, "Light laptop?");
        assert_eq!(messages[2].role, ChatRole::Model);
        assert_eq!(messages[2].text, "The MacBook Air is great.");
        assert!(!widget.is_streaming());
        assert!(widget.error().is_none());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let assistant = ScriptedAssistant::replying(&["x"]);
        let sent = Arc::clone(&assistant.sent);
        let mut widget = widget(assistant);

        assert_eq!(widget.send("   ", |_| {}).await, SendOutcome::Ignored);
        assert_eq!(widget.messages().len(), 1);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_appends_error_reply() {
        let mut assistant = ScriptedAssistant::replying(&[]);
        assistant.fail_send = true;
        let mut widget = widget(assistant);

        let outcome = widget.send("hi", |_| {}).await;
        assert!(matches!(outcome, SendOutcome::Failed(_)));

        let messages = widget.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text, "hi");
        assert_eq!(messages[2].text, ERROR_REPLY);
        assert_eq!(widget.error(), Some(ERROR_REPLY));

        // A failed reply does not lock the input
        assert!(widget.input_enabled());
    }

    #[tokio::test]
    async fn test_mid_stream_error_keeps_partial_reply() {
        let mut assistant = ScriptedAssistant::replying(&["Partial answer "]);
        assistant.script.push(Err("dropped".to_string()));
        let mut widget = widget(assistant);

        let outcome = widget.send("question", |_| {}).await;
        assert!(matches!(outcome, SendOutcome::Failed(_)));

        let texts: Vec<&str> = widget.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, "question", "Partial answer", ERROR_REPLY]);
    }

    #[tokio::test]
    async fn test_error_before_any_fragment_drops_placeholder() {
        let mut assistant = ScriptedAssistant::replying(&[]);
        assistant.script.push(Err("dropped".to_string()));
        let mut widget = widget(assistant);

        widget.send("question", |_| {}).await;
        let texts: Vec<&str> = widget.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, "question", ERROR_REPLY]);
    }

    #[tokio::test]
    async fn test_close_drops_transcript() {
        let assistant = ScriptedAssistant::replying(&["ok"]);
        let prompts = Arc::clone(&assistant.prompts);
        let mut widget = widget(assistant);
        widget.send("hello", |_| {}).await;
        assert_eq!(widget.messages().len(), 3);

        widget.toggle();
        assert!(!widget.is_open());
        assert!(widget.messages().is_empty());
        assert!(!widget.input_enabled());

        widget.toggle();
        assert_eq!(widget.messages().len(), 1);
        assert_eq!(prompts.lock().unwrap().len(), 2);
    }
}
