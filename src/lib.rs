// src/lib.rs

pub mod instrumentation;

// Re-exporting key items for easier external access, mirroring how the
// crate's types are exposed directly at the crate root rather than forcing
// callers through the full module path.
pub use instrumentation::{
    AsyncChatCompletionClient, AsyncChatCompletionOutcome, AsyncInstrumentedClient,
    ChatCompletionClient, ChatCompletionOutcome, ClientError, InstrumentedClient, Instrumentor,
    RawChatCompletionResponse, Span, SpanContext, SpanEvent, SpanKind, StatusCode, Tracer,
};

/// Initialize the `log`/`env_logger` backend once per process.
///
/// Safe to call from every test (as the surrounding crate's test suite
/// does): a second call is a no-op rather than a panic.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(false).try_init();
}
