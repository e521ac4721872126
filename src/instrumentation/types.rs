//! Wire-level request/response/chunk types for the OpenAI-compatible chat
//! completion endpoint.
//!
//! These mirror the JSON shapes described in `spec.md` §6 ("Upstream client
//! contract"). Field order matches declaration order, which is what gives
//! `serde_json`'s output its "canonical JSON (object key order preserved
//! from insertion)" property once the `preserve_order` feature is enabled.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One message in a chat completion request or response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "function_call")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "tool_calls")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// A `{name, arguments}` function-call payload, either as sent by the model
/// in a legacy (non-streaming) response or reconstructed by the accumulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// One entry of an OpenAI `tool_calls` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub function: ToolCallFunction,
}

/// The `function` object nested inside a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallFunction {
    pub name: String,
    pub arguments: String,
}

/// A request to the chat completions endpoint.
///
/// `extra` carries any recognized invocation parameter this struct does not
/// name explicitly (e.g. `top_p`, `functions`, `tools`, `stream`), so the
/// invocation-parameters attribute can still serialize the *full* recognized
/// subset of the request even as new parameters are added upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ChatCompletionRequest {
    /// `true` when the caller asked for a streamed response.
    pub fn wants_stream(&self) -> bool {
        matches!(self.extra.get("stream"), Some(Value::Bool(true)))
    }
}

/// Token accounting returned alongside a non-streaming response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// One entry of a non-streaming response's `choices` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// A fully parsed, non-streaming chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Incremental delta carried by one streamed chunk's `choices[0].delta`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<PartialFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<PartialToolCall>>,
}

/// A partial `function_call` delta: either field may be absent on a given chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// A partial `tool_calls[]` entry delta, keyed by `index`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialToolCall {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<PartialFunctionCall>,
}

/// One entry of a streamed chunk's `choices` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Delta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// A single streamed delta chunk (`data: <json>\n\n` line, already decoded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub choices: Vec<ChunkChoice>,
}

/// A request to the legacy (non-chat) text-completions endpoint.
///
/// Calls using this type are never wrapped by the [`Instrumentor`](crate::instrumentation::instrumentor::Instrumentor);
/// they pass straight through to the underlying client and produce no span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyCompletionRequest {
    pub model: String,
    pub prompt: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}
