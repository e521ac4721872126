//! The cooperatively-suspending call interceptor (`spec.md` §4.3).
//!
//! Shares all logic with [`crate::instrumentation::interceptor::blocking::Interceptor`]
//! except the manner of waiting for the underlying call (`.await` instead of
//! a synchronous return); both call into the same
//! [`crate::instrumentation::interceptor::core`] helpers so they cannot
//! silently diverge.

use std::sync::Arc;

use crate::instrumentation::client::{AsyncChatCompletionClient, AsyncChatCompletionOutcome, ClientError};
use crate::instrumentation::interceptor::core;
use crate::instrumentation::stream::asynchronous::InstrumentedStream;
use crate::instrumentation::tracer::Tracer;
use crate::instrumentation::types::ChatCompletionRequest;

/// Wraps a suspending [`AsyncChatCompletionClient`], emitting one span per call.
pub struct Interceptor {
    inner: Arc<dyn AsyncChatCompletionClient>,
    tracer: Tracer,
}

impl Interceptor {
    /// Build an interceptor around `inner`, recording finished spans to `tracer`.
    pub fn new(inner: Arc<dyn AsyncChatCompletionClient>, tracer: Tracer) -> Self {
        Interceptor { inner, tracer }
    }

    /// The wrapped client, for delegating the legacy completions endpoint.
    pub fn inner(&self) -> &Arc<dyn AsyncChatCompletionClient> {
        &self.inner
    }

    /// Intercept one chat-completion call, suspending at the underlying
    /// client's own await points.
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<AsyncChatCompletionOutcome, ClientError> {
        let mut span = core::begin_span(&request);

        match self.inner.chat_completion(request.clone()).await {
            Ok(AsyncChatCompletionOutcome::Message(response)) => {
                core::finish_success(&mut span, &request, &response);
                self.tracer.record(span);
                Ok(AsyncChatCompletionOutcome::Message(response))
            }
            Ok(AsyncChatCompletionOutcome::RawMessage(raw)) => {
                match raw.parse() {
                    Ok(response) => core::finish_success(&mut span, &request, &response),
                    Err(_) => span.finish_ok(chrono::Utc::now()),
                }
                self.tracer.record(span);
                Ok(AsyncChatCompletionOutcome::RawMessage(raw))
            }
            Ok(AsyncChatCompletionOutcome::Stream(chunks)) => {
                let wrapped = InstrumentedStream::new(chunks, span, self.tracer.clone(), request);
                Ok(AsyncChatCompletionOutcome::Stream(Box::pin(wrapped)))
            }
            Ok(AsyncChatCompletionOutcome::RawStream(chunks)) => {
                let wrapped = InstrumentedStream::new(chunks, span, self.tracer.clone(), request);
                Ok(AsyncChatCompletionOutcome::RawStream(Box::pin(wrapped)))
            }
            Err(error) => {
                core::finish_failure(&mut span, &error);
                self.tracer.record(span);
                Err(error)
            }
        }
    }
}
