//! The cooperatively-suspending chunk-stream driver.
//!
//! Pulls chunks via [`Stream::poll_next`] and hands them to the same shared
//! [`StreamState`] the blocking driver in
//! [`crate::instrumentation::stream::blocking`] uses; contains no
//! aggregation or finalization logic of its own.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::Stream;

use crate::instrumentation::client::ChunkResult;
use crate::instrumentation::span::Span;
use crate::instrumentation::stream::StreamState;
use crate::instrumentation::tracer::Tracer;
use crate::instrumentation::types::ChatCompletionRequest;

/// Wraps a suspending chunk stream so that, as it is exhausted, a single
/// span describing the whole stream is recorded on the owning [`Tracer`].
///
/// Yields every chunk the wrapped stream yields, unchanged, in order.
pub struct InstrumentedStream<S> {
    inner: S,
    state: StreamState,
}

impl<S> InstrumentedStream<S>
where
    S: Stream<Item = ChunkResult> + Unpin,
{
    /// Wrap `inner`, seeding the accumulator's span with the input
    /// attributes the interceptor already populated.
    pub fn new(inner: S, span: Span, tracer: Tracer, request: ChatCompletionRequest) -> Self {
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

impl<S> Stream for InstrumentedStream<S>
where
    S: Stream<Item = ChunkResult> + Unpin,
{
    type Item = ChunkResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state.finalized() {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                this.state.observe_chunk(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(error))) => {
                this.state.finalize_error(&error);
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(None) => {
                this.state.finalize_ok();
                Poll::Ready(None)
            }
        }
    }
}
