//! Gemini streaming assistant
//!
//! Uses `models/{model}:streamGenerateContent?alt=sse`. Each SSE `data:`
//! line carries a JSON chunk whose candidate parts hold the next text
//! fragment. A session keeps the conversation history and resends it with
//! every message; a turn is recorded once its reply has streamed to the end.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{Assistant, AssistantError, AssistantSession, FragmentStream};
use crate::config::AssistantConfig;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Part {
    text: String,
}

impl Content {
    fn new(role: &'static str, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Assistant backed by the Gemini API
#[derive(Clone)]
pub struct GeminiAssistant {
    http: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiAssistant {
    /// Build from config. A missing key is not an error until a session
    /// is started.
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        // No overall timeout: a reply streams for as long as the model writes
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Format check only; Google API keys start with "AIza"
    pub fn is_valid_api_key_format(key: &str) -> bool {
        let trimmed = key.trim();
        !trimmed.is_empty() && trimmed.starts_with("AIza")
    }
}

impl Assistant for GeminiAssistant {
    fn start_session(&self, system_prompt: &str) -> Result<Box<dyn AssistantSession>, AssistantError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AssistantError::MissingApiKey)?;

        if !Self::is_valid_api_key_format(api_key) {
            return Err(AssistantError::InvalidApiKey);
        }

        tracing::debug!(model = %self.model, "Starting assistant session");

        Ok(Box::new(GeminiSession {
            http: self.http.clone(),
            api_key: api_key.to_string(),
            endpoint: format!(
                "{}/models/{}:streamGenerateContent?alt=sse",
                self.base_url, self.model
            ),
            system_prompt: system_prompt.to_string(),
            history: Arc::new(Mutex::new(Vec::new())),
        }))
    }
}

/// One Gemini conversation
pub struct GeminiSession {
    http: Client,
    api_key: String,
    endpoint: String,
    system_prompt: String,
    history: Arc<Mutex<Vec<Content>>>,
}

impl GeminiSession {
    /// Completed turns (user and model entries) held in the history
    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    fn request_body(&self, text: &str) -> Result<serde_json::Value, AssistantError> {
        let mut contents = self
            .history
            .lock()
            .map_err(|e| AssistantError::Stream(e.to_string()))?
            .clone();
        contents.push(Content::new("user", text));

        Ok(serde_json::json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{ "text": self.system_prompt }]
            }
        }))
    }
}

#[async_trait]
impl AssistantSession for GeminiSession {
    async fn send_message_stream(&mut self, text: &str) -> Result<FragmentStream, AssistantError> {
        let body = self.request_body(text)?;
        tracing::debug!(history = self.history_len(), "Sending assistant message");

        let response = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status,
                message: api_error_message(&text),
            });
        }

        let (tx, rx) = mpsc::channel(32);
        let history = Arc::clone(&self.history);
        let user_text = text.to_string();

        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut decoder = SseDecoder::default();
            let mut reply = String::new();

            while let Some(item) = bytes.next().await {
                let chunk = match item {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(AssistantError::Request(e))).await;
                        return;
                    }
                };

                if !forward(decoder.push(&chunk), &tx, &mut reply).await {
                    return;
                }
            }

            if !forward(decoder.finish(), &tx, &mut reply).await {
                return;
            }

            match history.lock() {
                Ok(mut history) => {
                    history.push(Content::new("user", user_text));
                    history.push(Content::new("model", reply));
                }
                Err(e) => tracing::warn!("Assistant history unavailable: {}", e),
            }
        });

        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });

        Ok(Box::pin(stream))
    }
}

/// Send the fragments of decoded events. Returns false when the stream
/// should stop: an error was sent or the receiver is gone.
async fn forward(
    events: Vec<String>,
    tx: &mpsc::Sender<Result<String, AssistantError>>,
    reply: &mut String,
) -> bool {
    for event in events {
        match parse_event(&event) {
            Ok(Some(fragment)) => {
                reply.push_str(&fragment);
                if tx.send(Ok(fragment)).await.is_err() {
                    return false;
                }
            }
            Ok(None) => {}
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return false;
            }
        }
    }
    true
}

/// Text of one streamed chunk; `None` when it carries no text
fn parse_event(data: &str) -> Result<Option<String>, AssistantError> {
    let json: serde_json::Value =
        serde_json::from_str(data).map_err(|e| AssistantError::Decode(e.to_string()))?;

    if let Some(error) = json.get("error") {
        return Err(AssistantError::Api {
            status: error["code"].as_u64().unwrap_or(0) as u16,
            message: error["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        });
    }

    let text: String = json["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                "Empty error response".to_string()
            } else {
                body.chars().take(300).collect()
            }
        })
}

/// Splits an SSE byte stream into `data:` payloads.
///
/// Bytes are buffered until a full line arrives, so a multi-byte character
/// split across network chunks decodes intact.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = Self::data(&line[..line.len() - 1]) {
                events.push(data);
            }
        }
        events
    }

    /// Flush a final line that was not newline-terminated
    fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.buffer);
        Self::data(&line).into_iter().collect()
    }

    fn data(line: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches('\r');
        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);
        if data.trim().is_empty() {
            None
        } else {
            Some(data.to_string())
        }
    }
}
