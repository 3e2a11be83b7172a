//! Chat transcript rendering

use crate::chat::{ChatMessage, ChatRole};

fn speaker(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "You",
        ChatRole::Model => "Assistant",
    }
}

pub fn render_message(message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}",
        message.timestamp.format("%H:%M"),
        speaker(message.role),
        message.text
    )
}

/// Whole transcript, with the widget error underneath when set
pub fn render_transcript(messages: &[ChatMessage], error: Option<&str>) -> String {
    let mut lines: Vec<String> = messages.iter().map(render_message).collect();
    if let Some(error) = error {
        lines.push(format!("! {}", error));
    }
    lines.join("\n")
}
