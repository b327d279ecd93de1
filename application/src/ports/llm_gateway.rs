//! LLM Gateway port
//!
//! Defines the interface for communicating with model backends. Each
//! invocation is independent: one backend's failure (timeout, non-2xx,
//! malformed payload) surfaces as an error value on that invocation
//! alone and never disturbs concurrent sibling calls.

use async_trait::async_trait;
use council_domain::{Message, Model, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP status {status}: {detail}")]
    HttpStatus { status: u16, detail: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Handle for receiving streaming events from one model invocation.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience
/// methods for consuming the stream. Dropping the handle aborts the
/// underlying request.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without a terminal marker — return what we have
        Ok(full_text)
    }
}

/// Gateway for model backend communication
///
/// This port defines how the application layer talks to interchangeable
/// external backends. Implementations (adapters) live in the
/// infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a message list and wait for the complete response text.
    async fn complete(&self, model: &Model, messages: &[Message])
    -> Result<String, GatewayError>;

    /// Send a message list and receive the response incrementally.
    ///
    /// Chunks are delivered in generation order for this invocation; the
    /// stream ends with `Completed` or `Error`. The default implementation
    /// calls [`complete`](Self::complete) and wraps the result in a single
    /// terminal event, so non-streaming adapters work without changes.
    async fn complete_streaming(
        &self,
        model: &Model,
        messages: &[Message],
    ) -> Result<StreamHandle, GatewayError> {
        let (tx, rx) = mpsc::channel(1);
        let event = match self.complete(model, messages).await {
            Ok(text) => StreamEvent::Completed(text),
            Err(e) => StreamEvent::Error(e.to_string()),
        };
        // If the receiver is dropped, that's fine
        let _ = tx.send(event).await;
        Ok(StreamHandle::new(rx))
    }
}
