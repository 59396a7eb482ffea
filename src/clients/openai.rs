//! OpenAI-compatible chat completions client used as the generation capability

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{Value, json};

use crate::clients::traits::{GenerationError, GenerationRequest, TextGenerator};
use crate::config::GenerationConfig;

const BODY_SNIPPET_MAX: usize = 500;

/// Incremental parser for server-sent-event chat completion streams.
///
/// Bytes may split lines (and UTF-8 sequences) at arbitrary points, so the
/// parser buffers raw bytes and only decodes complete lines.
pub struct SseTextParser {
    buffer: Vec<u8>,
    text: String,
    done: bool,
}

impl Default for SseTextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SseTextParser {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            text: String::new(),
            done: false,
        }
    }

    /// Feed one chunk of the byte stream.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            self.handle_line(line.trim());
        }
    }

    /// Flush any trailing unterminated line and return the accumulated text.
    pub fn finish(mut self) -> String {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).to_string();
            self.handle_line(line.trim());
        }
        self.text
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn handle_line(&mut self, line: &str) {
        if line.is_empty() || line.starts_with(':') || self.done {
            return;
        }
        let Some(payload) = line.strip_prefix("data:") else {
            return;
        };
        let payload = payload.trim();
        if payload == "[DONE]" {
            self.done = true;
            return;
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(event) => {
                if let Some(delta) = extract_delta_text(&event) {
                    self.text.push_str(delta);
                }
            }
            Err(e) => {
                tracing::debug!("Failed to parse stream event: {}", e);
                tracing::debug!("Problematic line: {}", line);
            }
        }
    }
}

fn extract_delta_text(event: &Value) -> Option<&str> {
    let choice = event.get("choices")?.get(0)?;
    choice
        .get("delta")
        .and_then(|d| d.get("content"))
        .and_then(|c| c.as_str())
        // Some gateways ignore `stream` and send whole messages as one event
        .or_else(|| {
            choice
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str())
        })
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: Client,
    base_url: String,
    api_key: String,
    temperature: f32,
}

impl OpenAiCompatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        temperature: f32,
    ) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .build()
            .map_err(|e| GenerationError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            temperature,
        })
    }

    /// Build a client from configuration, reading the key from the configured env var.
    pub fn from_config(
        config: &GenerationConfig,
        api_key: Option<&str>,
    ) -> Result<Self, GenerationError> {
        let key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerationError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config.base_url.clone(), key, config.temperature)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(json!({"role": "system", "content": request.system_instructions}));
        for m in &request.messages {
            messages.push(json!({"role": m.role, "content": m.content}));
        }
        json!({
            "model": request.model,
            "messages": messages,
            "temperature": self.temperature,
            "stream": true
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        tracing::debug!(
            model = %request.model,
            system_len = request.system_instructions.len(),
            messages = request.messages.len(),
            "generation request"
        );

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: truncate_snippet(body.trim(), BODY_SNIPPET_MAX),
            });
        }

        let mut parser = SseTextParser::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| GenerationError::Stream(e.to_string()))?;
            parser.push(&chunk);
            if parser.is_done() {
                break;
            }
        }

        let text = parser.finish();
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        tracing::debug!(response_len = text.len(), "generation complete");
        Ok(text)
    }
}

fn truncate_snippet(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }
    let mut end = max;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}
