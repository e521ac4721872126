//! Span lifecycle steps shared by the blocking and suspending interceptor
//! variants (`spec.md` §4.3).
//!
//! Neither variant duplicates this logic; each only supplies the manner of
//! waiting for the underlying call; these three functions are the single
//! source of truth for what happens before and after that wait.

use chrono::Utc;

use crate::instrumentation::client::ClientError;
use crate::instrumentation::errors::exception_event;
use crate::instrumentation::extractor::{input_attributes, response_attributes};
use crate::instrumentation::span::{Span, SpanKind};
use crate::instrumentation::types::{ChatCompletionRequest, ChatCompletionResponse};

/// Start a span at call entry: `LLM` kind, `UNSET` status, attributes seeded
/// with input messages and invocation parameters.
pub(crate) fn begin_span(request: &ChatCompletionRequest) -> Span {
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("Interceptor::chat_completion(...): model={}", request.model);
    }
    let mut span = Span::start(SpanKind::Llm, Utc::now());
    span.extend_attributes(input_attributes(request));
    span
}

/// Finalize a span after a successful, non-streaming response.
pub(crate) fn finish_success(
    span: &mut Span,
    request: &ChatCompletionRequest,
    response: &ChatCompletionResponse,
) {
    span.extend_attributes(response_attributes(request, response));
    span.finish_ok(Utc::now());
}

/// Finalize a span after the underlying call raised an exception.
pub(crate) fn finish_failure(span: &mut Span, error: &ClientError) {
    if log::log_enabled!(log::Level::Error) {
        log::error!("Interceptor::chat_completion(...): upstream error: {}", error);
    }
    let now = Utc::now();
    span.push_event(exception_event(error, now));
    span.finish_error(error.message().to_string(), now);
}
