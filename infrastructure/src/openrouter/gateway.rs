//! OpenRouter adapter for the [`LlmGateway`] port.
//!
//! Talks to an OpenRouter-compatible chat-completions endpoint over
//! HTTPS. Every invocation is an independent request with its own
//! timeout; a failed or malformed call surfaces as a `GatewayError` (or
//! a terminal `StreamEvent::Error` on the streaming path) and never
//! affects concurrent sibling calls.

use super::protocol::{
    ChatApiRequest, ChatApiResponse, MAX_TOKENS, SsePayload, parse_sse_line,
};
use async_trait::async_trait;
use council_application::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use council_domain::{Message, Model, StreamEvent};
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// OpenRouter API adapter
#[derive(Debug, Clone)]
pub struct OpenRouterGateway {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl OpenRouterGateway {
    /// Create from an API key with default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_config(
            api_key,
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create by reading the API key from the given environment variable.
    pub fn from_env(key_env: &str, base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let api_key = std::env::var(key_env)
            .map_err(|_| GatewayError::Config(format!("{key_env} not set")))?;
        Self::with_config(api_key, base_url, timeout)
    }

    /// Create with explicit endpoint and timeout.
    pub fn with_config(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| GatewayError::Config("Invalid API key format".into()))?;
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            GatewayError::ConnectionError(e.to_string())
        } else {
            GatewayError::RequestFailed(e.to_string())
        }
    }

    async fn send_request(
        &self,
        model: &Model,
        messages: &[Message],
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let body = ChatApiRequest {
            model: model.as_str(),
            messages,
            max_tokens: MAX_TOKENS,
            stream: stream.then_some(true),
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = detail.chars().take(200).collect();
            return Err(GatewayError::HttpStatus {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmGateway for OpenRouterGateway {
    async fn complete(
        &self,
        model: &Model,
        messages: &[Message],
    ) -> Result<String, GatewayError> {
        debug!("Requesting completion from {}", model);
        let response = self.send_request(model, messages, false).await?;

        let parsed: ChatApiResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::MalformedResponse("no content in response".into()))
    }

    async fn complete_streaming(
        &self,
        model: &Model,
        messages: &[Message],
    ) -> Result<StreamHandle, GatewayError> {
        debug!("Requesting streamed completion from {}", model);
        let response = self.send_request(model, messages, true).await?;

        let (tx, rx) = mpsc::channel(64);
        let model_name = model.to_string();

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            // SSE lines can straddle network chunks
            let mut pending = String::new();
            let mut full_text = String::new();

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!("Stream from {} broke: {}", model_name, e);
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };

                pending.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = pending.find('\n') {
                    let line: String = pending.drain(..=pos).collect();
                    match parse_sse_line(&line) {
                        SsePayload::Done => {
                            let _ = tx.send(StreamEvent::Completed(full_text)).await;
                            return;
                        }
                        SsePayload::Delta(content) => {
                            full_text.push_str(&content);
                            if tx.send(StreamEvent::Delta(content)).await.is_err() {
                                // Receiver gone, abort the request
                                return;
                            }
                        }
                        SsePayload::Ignored => {}
                    }
                }
            }

            // Body ended without [DONE]; treat what we have as complete
            let _ = tx.send(StreamEvent::Completed(full_text)).await;
        });

        Ok(StreamHandle::new(rx))
    }
}
