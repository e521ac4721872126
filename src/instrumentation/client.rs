//! The "upstream client contract" the instrumentation core depends on.
//!
//! Everything in this module is the external interface described by
//! `spec.md` §6: a chat-completion entry point, its streaming and
//! raw-response variants, and the legacy (uninstrumented) completions
//! endpoint. The actual HTTP transport and JSON decoding that would sit
//! behind an implementation of these traits are out of scope — callers
//! plug in their own client, implementing one request/response trait per
//! provider the way a multi-provider chat client keeps one implementation
//! per vendor SDK behind a shared trait.

use std::any::Any;
use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::stream::Stream;

use crate::instrumentation::types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, LegacyCompletionRequest,
};

/// Errors the core must be able to distinguish when building a
/// [`SpanException`](crate::instrumentation::span::SpanEvent::SpanException) event.
///
/// Granularity matches what `spec.md` §7/§8 actually tests for: an
/// authentication failure must be reported as such (scenario 4 / P7), while
/// every other transport or protocol failure is reported generically.
#[derive(Debug, Clone)]
pub enum ClientError {
    /// The upstream rejected the request's credentials.
    Authentication { message: String },
    /// Any other transport/protocol failure (timeouts, 5xx, malformed body, ...).
    Transport { message: String },
    /// A failure that does not fit the above, surfaced as-is.
    Other { message: String },
}

impl ClientError {
    /// The `exception.type` value recorded for this error: its Rust-ish
    /// "exception name", mirroring what the original Python client would
    /// raise (`AuthenticationError`, ...).
    pub fn kind_name(&self) -> &'static str {
        match self {
            ClientError::Authentication { .. } => "AuthenticationError",
            ClientError::Transport { .. } => "TransportError",
            ClientError::Other { .. } => "ClientError",
        }
    }

    /// The error's message, independent of `Display`'s prefix-free formatting.
    pub fn message(&self) -> &str {
        match self {
            ClientError::Authentication { message }
            | ClientError::Transport { message }
            | ClientError::Other { message } => message,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ClientError {}

/// A "raw response" wrapper whose body has not been parsed yet.
///
/// Mirrors the upstream SDK pattern where `.with_raw_response` defers JSON
/// decoding until `.parse()` is called; the interceptor must populate span
/// attributes by parsing it once rather than skipping output attributes
/// entirely.
#[derive(Debug, Clone)]
pub struct RawChatCompletionResponse {
    body: serde_json::Value,
}

impl RawChatCompletionResponse {
    /// Wrap an already-decoded JSON body.
    pub fn new(body: serde_json::Value) -> Self {
        RawChatCompletionResponse { body }
    }

    /// Parse the body into a [`ChatCompletionResponse`].
    pub fn parse(&self) -> Result<ChatCompletionResponse, ClientError> {
        serde_json::from_value(self.body.clone()).map_err(|e| ClientError::Other {
            message: format!("failed to parse raw chat completion response: {e}"),
        })
    }

    /// The undecoded JSON body, for attribute extraction that needs the
    /// literal bytes rather than the typed struct.
    pub fn raw_body(&self) -> &serde_json::Value {
        &self.body
    }
}

/// `Result` alias for one pulled chunk.
pub type ChunkResult = Result<ChatCompletionChunk, ClientError>;

/// A boxed, blocking chunk iterator, as returned by [`ChatCompletionClient::chat_completion`]
/// when the caller requested `stream = true`.
pub type ChunkIterator = Box<dyn Iterator<Item = ChunkResult> + Send>;

/// A boxed, cooperatively-suspending chunk stream, as returned by
/// [`AsyncChatCompletionClient::chat_completion`] when the caller requested
/// `stream = true`.
pub type ChunkStream = Pin<Box<dyn Stream<Item = ChunkResult> + Send>>;

/// The shape of a successful, blocking chat-completion call.
pub enum ChatCompletionOutcome {
    /// A fully parsed, non-streaming response.
    Message(ChatCompletionResponse),
    /// A non-streaming response whose body has not been parsed yet.
    RawMessage(RawChatCompletionResponse),
    /// An already-decoded chunk iterator for a streaming request.
    Stream(ChunkIterator),
    /// A streaming request made through the raw-response wrapper form.
    RawStream(ChunkIterator),
}

/// The shape of a successful, suspending chat-completion call.
pub enum AsyncChatCompletionOutcome {
    /// A fully parsed, non-streaming response.
    Message(ChatCompletionResponse),
    /// A non-streaming response whose body has not been parsed yet.
    RawMessage(RawChatCompletionResponse),
    /// An already-decoded chunk stream for a streaming request.
    Stream(ChunkStream),
    /// A streaming request made through the raw-response wrapper form.
    RawStream(ChunkStream),
}

/// The blocking variant of the upstream chat-completion entry point.
///
/// Implementors must also provide [`as_any`](ChatCompletionClient::as_any) so
/// [`Instrumentor`](crate::instrumentation::instrumentor::Instrumentor) can
/// detect an already-instrumented handle and keep installation idempotent.
pub trait ChatCompletionClient: Send + Sync {
    /// Perform a chat completion call. `request.wants_stream()` tells the
    /// implementation whether to return a [`ChatCompletionOutcome::Stream`]
    /// rather than a [`ChatCompletionOutcome::Message`].
    fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionOutcome, ClientError>;

    /// The legacy text-completions endpoint. Never wrapped by the
    /// instrumentor; calls here produce no span.
    fn completion(&self, request: LegacyCompletionRequest) -> Result<String, ClientError>;

    /// Support downcasting a `&dyn ChatCompletionClient` back to its concrete
    /// type, used only to detect an already-instrumented client.
    fn as_any(&self) -> &dyn Any;
}

/// The cooperatively-suspending variant of the upstream chat-completion entry point.
#[async_trait]
pub trait AsyncChatCompletionClient: Send + Sync {
    /// Perform a chat completion call, suspending at I/O boundaries.
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<AsyncChatCompletionOutcome, ClientError>;

    /// The legacy text-completions endpoint. Never wrapped by the
    /// instrumentor; calls here produce no span.
    async fn completion(&self, request: LegacyCompletionRequest) -> Result<String, ClientError>;

    /// Support downcasting a `&dyn AsyncChatCompletionClient` back to its
    /// concrete type, used only to detect an already-instrumented client.
    fn as_any(&self) -> &dyn Any;
}
