//! The blocking chunk-iterator driver.
//!
//! Pulls chunks via [`Iterator::next`] and hands them to the shared
//! [`StreamState`]; contains no aggregation or finalization logic of its
//! own.

use crate::instrumentation::client::ChunkResult;
use crate::instrumentation::span::Span;
use crate::instrumentation::stream::StreamState;
use crate::instrumentation::tracer::Tracer;
use crate::instrumentation::types::ChatCompletionRequest;

/// Wraps a blocking chunk iterator so that, as it is exhausted, a single
/// span describing the whole stream is recorded on the owning [`Tracer`].
///
/// Yields every chunk the wrapped iterator yields, unchanged, in order.
pub struct InstrumentedStream<I> {
    inner: I,
    state: StreamState,
}

impl<I> InstrumentedStream<I>
where
    I: Iterator<Item = ChunkResult>,
{
    /// Wrap `inner`, seeding the accumulator's span with the input
    /// attributes the interceptor already populated.
    pub fn new(inner: I, span: Span, tracer: Tracer, request: ChatCompletionRequest) -> Self {
        InstrumentedStream {
            inner,
            state: StreamState::new(span, tracer, request),
        }
    }

    /// Finalize early, before the stream is exhausted, with status `UNSET`
    /// and a `"Stream Closed Early"` event. A no-op if the stream already
    /// finalized normally or on error.
    pub fn close(mut self) {
        self.state.close();
    }
}

impl<I> Iterator for InstrumentedStream<I>
where
    I: Iterator<Item = ChunkResult>,
{
    type Item = ChunkResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.finalized() {
            return None;
        }
        match self.inner.next() {
            Some(Ok(chunk)) => {
                self.state.observe_chunk(&chunk);
                Some(Ok(chunk))
            }
            Some(Err(error)) => {
                self.state.finalize_error(&error);
                Some(Err(error))
            }
            None => {
                self.state.finalize_ok();
                None
            }
        }
    }
}
