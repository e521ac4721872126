//! The process-wide sink that owns finalized spans.
//!
//! Wraps its backing `Vec` in a `Mutex` behind a small method set rather than
//! exposing the lock directly, the same shape the teacher crate's own
//! memory/history types use around their backing collections.

use std::sync::{Arc, Mutex};

use crate::instrumentation::span::Span;

/// Sink to which finalized spans are handed.
///
/// Cloning a `Tracer` is cheap and shares the same backing store (it is an
/// `Arc<Mutex<Vec<Span>>>` under the hood), matching the spec's requirement
/// that the sink be shared and that appends be atomic with respect to
/// concurrent appenders.
#[derive(Clone, Default)]
pub struct Tracer {
    spans: Arc<Mutex<Vec<Span>>>,
}

impl Tracer {
    /// Create an empty tracer.
    pub fn new() -> Self {
        Tracer {
            spans: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Finalize and record `span`. Spans are appended in the order their
    /// owning interceptor/accumulator calls `record`, which is not
    /// necessarily the order their calls started.
    pub fn record(&self, span: Span) {
        let mut spans = self.spans.lock().expect("Tracer mutex poisoned");
        spans.push(span);
    }

    /// Snapshot the spans recorded so far, oldest first.
    pub fn get_spans(&self) -> Vec<Span> {
        self.spans.lock().expect("Tracer mutex poisoned").clone()
    }

    /// Number of spans recorded so far.
    pub fn len(&self) -> usize {
        self.spans.lock().expect("Tracer mutex poisoned").len()
    }

    /// `true` iff no spans have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
