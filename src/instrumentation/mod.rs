//! LLM call instrumentation core.
//!
//! A transparent interception layer for OpenAI-compatible chat-completion
//! clients: wrap a client once with [`instrumentor::Instrumentor`] and every
//! call through the wrapper emits a structured [`span::Span`] describing the
//! request, the response (or the streamed reconstruction of one), and any
//! error raised along the way.

pub mod accumulator;
pub mod client;
pub mod errors;
pub mod extractor;
pub mod instrumentor;
pub mod interceptor;
pub mod semantic_conventions;
pub mod span;
pub mod stream;
pub mod tracer;
pub mod types;

pub use client::{
    AsyncChatCompletionClient, AsyncChatCompletionOutcome, ChatCompletionClient,
    ChatCompletionOutcome, ClientError, RawChatCompletionResponse,
};
pub use instrumentor::{AsyncInstrumentedClient, InstrumentedClient, Instrumentor};
pub use span::{AttributeMap, AttributeValue, Span, SpanContext, SpanEvent, SpanKind, StatusCode};
pub use tracer::Tracer;
pub use types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice,
    LegacyCompletionRequest, ToolCall, Usage,
};
