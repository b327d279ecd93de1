//! Wire types and SSE parsing for the chat-completions protocol.

use council_domain::Message;
use serde::{Deserialize, Serialize};

/// Explicit limit to prevent truncation surprises on long syntheses
pub(crate) const MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
pub(crate) struct ChatApiRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Deserialize)]
pub(crate) struct ChatApiResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Deserialize)]
pub(crate) struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

/// One parsed server-sent-events line
#[derive(Debug, PartialEq)]
pub(crate) enum SsePayload {
    /// `data: [DONE]`, stream finished
    Done,
    /// A content fragment extracted from a data chunk
    Delta(String),
    /// Comments, keep-alives, empty deltas, unparseable chunks
    Ignored,
}

/// Parse one line of an SSE body.
///
/// Non-`data:` lines and chunks that don't decode are ignored rather
/// than treated as errors; providers interleave keep-alive comments.
pub(crate) fn parse_sse_line(line: &str) -> SsePayload {
    let Some(data) = line.trim().strip_prefix("data: ") else {
        return SsePayload::Ignored;
    };

    if data.trim() == "[DONE]" {
        return SsePayload::Done;
    }

    let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) else {
        return SsePayload::Ignored;
    };

    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
    {
        Some(content) if !content.is_empty() => SsePayload::Delta(content),
        _ => SsePayload::Ignored,
    }
}
