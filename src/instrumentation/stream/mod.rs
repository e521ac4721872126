//! Stream drivers: thin `Iterator`/`Stream` adapters that pull chunks and
//! feed them to the shared [`Accumulator`](crate::instrumentation::accumulator::Accumulator)
//! engine, then finalize a span exactly once.
//!
//! Per the Design Notes' "dual sync/async duplication" guidance, the two
//! drivers ([`blocking::InstrumentedStream`] and
//! [`asynchronous::InstrumentedStream`]) share every piece of bookkeeping
//! that isn't specific to how a chunk is pulled: both hold a [`StreamState`]
//! and differ only in the one line that calls `Iterator::next` vs.
//! `Stream::poll_next`.

pub mod asynchronous;
pub mod blocking;

use chrono::Utc;

use crate::instrumentation::accumulator::Accumulator;
use crate::instrumentation::client::ClientError;
use crate::instrumentation::errors::exception_event;
use crate::instrumentation::extractor::streaming_attributes;
use crate::instrumentation::semantic_conventions::{
    FIRST_TOKEN_STREAM_EVENT_NAME, STREAM_CLOSED_EARLY_EVENT_NAME,
};
use crate::instrumentation::span::{Span, SpanEvent};
use crate::instrumentation::tracer::Tracer;
use crate::instrumentation::types::ChatCompletionRequest;

/// Everything a stream driver needs besides the means of pulling a chunk.
///
/// Owns the span being built, the accumulator, the destination tracer, and
/// the request the span was seeded from (needed to decide the top-level
/// function-call attribute and to resolve invocation parameters again at
/// finalization time).
pub(crate) struct StreamState {
    accumulator: Accumulator,
    span: Option<Span>,
    tracer: Tracer,
    request: ChatCompletionRequest,
    first_token_recorded: bool,
    finalized: bool,
}

impl StreamState {
    pub(crate) fn new(span: Span, tracer: Tracer, request: ChatCompletionRequest) -> Self {
        StreamState {
            accumulator: Accumulator::new(),
            span: Some(span),
            tracer,
            request,
            first_token_recorded: false,
            finalized: false,
        }
    }

    /// `true` once the span has been handed to the tracer; once true, no
    /// further chunks should be pulled from the inner iterator/stream.
    pub(crate) fn finalized(&self) -> bool {
        self.finalized
    }

    /// Record a successfully-yielded chunk, recording the first-token event
    /// the first time this is called.
    pub(crate) fn observe_chunk(&mut self, chunk: &crate::instrumentation::types::ChatCompletionChunk) {
        if !self.first_token_recorded {
            self.first_token_recorded = true;
            if let Some(span) = &mut self.span {
                span.push_event(SpanEvent::message(FIRST_TOKEN_STREAM_EVENT_NAME, Utc::now()));
            }
        }
        self.accumulator.observe(chunk);
    }

    /// Finalize successfully: status `OK`, attributes from everything
    /// observed so far.
    pub(crate) fn finalize_ok(&mut self) {
        let Some(mut span) = self.span.take() else {
            return;
        };
        let aggregated = self.accumulator.aggregated_message();
        let attributes =
            streaming_attributes(&self.request, &aggregated, self.accumulator.raw_chunks());
        span.extend_attributes(attributes);
        span.finish_ok(Utc::now());
        self.tracer.record(span);
        self.finalized = true;
    }

    /// Finalize on a mid-stream fault: push the exception event before
    /// setting status `ERROR`, preserving whatever was aggregated so far.
    pub(crate) fn finalize_error(&mut self, error: &ClientError) {
        let Some(mut span) = self.span.take() else {
            return;
        };
        if log::log_enabled!(log::Level::Error) {
            log::error!("InstrumentedStream: mid-stream error: {}", error);
        }
        let now = Utc::now();
        span.push_event(exception_event(error, now));
        let aggregated = self.accumulator.aggregated_message();
        let attributes =
            streaming_attributes(&self.request, &aggregated, self.accumulator.raw_chunks());
        span.extend_attributes(attributes);
        span.finish_error(error.message().to_string(), now);
        self.tracer.record(span);
        self.finalized = true;
    }

    /// Optional early-close hook (`spec.md` §5, "Cancellation"): finalize
    /// with status `UNSET` and a `"Stream Closed Early"` event. A no-op if
    /// the stream already finalized normally or on error.
    pub(crate) fn close(&mut self) {
        if self.finalized {
            return;
        }
        if let Some(mut span) = self.span.take() {
            let now = Utc::now();
            span.push_event(SpanEvent::message(STREAM_CLOSED_EARLY_EVENT_NAME, now));
            span.finish_unset(now);
            self.tracer.record(span);
        }
        self.finalized = true;
    }
}
