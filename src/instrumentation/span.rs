//! Span and event types produced by the instrumentation core.
//!
//! A [`Span`] is built incrementally by a [`crate::instrumentation::interceptor`]
//! or [`crate::instrumentation::accumulator`], then handed to a
//! [`Tracer`](crate::instrumentation::tracer::Tracer) exactly once. After that
//! it is immutable — nothing in this module exposes a way to mutate a `Span`
//! once [`Span::finish`] has been called on it.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use crate::instrumentation::semantic_conventions::{
    EXCEPTION_MESSAGE, EXCEPTION_STACKTRACE, EXCEPTION_TYPE, LLM_SPAN_NAME,
};

/// The kind of operation a span describes.
///
/// Kept as a non-exhaustive enum so that future span kinds (retrieval,
/// reranker, tool) can be added without breaking downstream matches; this
/// crate only ever constructs [`SpanKind::Llm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpanKind {
    /// A call to a large language model's chat completion endpoint.
    Llm,
}

/// The terminal status of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// No status has been assigned yet; only valid before [`Span::finish`].
    Unset,
    /// The call completed and a response was produced.
    Ok,
    /// The call raised an exception; at least one [`SpanEvent::SpanException`]
    /// event is present.
    Error,
}

/// Identifies a span within a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanContext {
    /// Identifies the trace this span belongs to.
    pub trace_id: Uuid,
    /// Identifies this span within its trace.
    pub span_id: Uuid,
    /// The parent span's id, if this span was created as a child of another.
    pub parent_id: Option<Uuid>,
}

impl SpanContext {
    /// Generate a fresh root context (no parent).
    pub fn new_root() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            span_id: Uuid::new_v4(),
            parent_id: None,
        }
    }
}

/// A value stored in a span's attribute map.
///
/// Attributes are always JSON-serializable; this is a thin wrapper around
/// [`serde_json::Value`] so call sites can use `.into()` from the common
/// Rust scalar types without importing `serde_json` themselves.
pub type AttributeValue = Value;

/// Append-only map from semantic key to attribute value.
///
/// An [`IndexMap`] is used (rather than a `HashMap`/`BTreeMap`) so that
/// attributes which are themselves serialized as JSON objects (e.g.
/// invocation parameters) preserve insertion order, matching the "canonical
/// JSON (object key order preserved from insertion)" requirement.
pub type AttributeMap = IndexMap<String, AttributeValue>;

/// A timestamped note attached to a span.
#[derive(Debug, Clone)]
pub enum SpanEvent {
    /// A generic named marker, e.g. the "First Token Stream Event".
    Message {
        /// The event's name.
        name: String,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
    },
    /// Records an exception raised during the call the owning span describes.
    SpanException {
        /// When the exception was observed.
        timestamp: DateTime<Utc>,
        /// Always contains [`EXCEPTION_TYPE`], [`EXCEPTION_MESSAGE`], and
        /// [`EXCEPTION_STACKTRACE`].
        attributes: AttributeMap,
    },
}

impl SpanEvent {
    /// Build a generic named event timestamped `now`.
    pub fn message(name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        SpanEvent::Message {
            name: name.into(),
            timestamp,
        }
    }

    /// Build a [`SpanEvent::SpanException`] from an error's type name and message.
    pub fn exception(kind: &str, message: &str, stacktrace: String, timestamp: DateTime<Utc>) -> Self {
        let mut attributes = AttributeMap::new();
        attributes.insert(EXCEPTION_TYPE.to_string(), Value::from(kind));
        attributes.insert(EXCEPTION_MESSAGE.to_string(), Value::from(message));
        attributes.insert(EXCEPTION_STACKTRACE.to_string(), Value::from(stacktrace));
        SpanEvent::SpanException {
            timestamp,
            attributes,
        }
    }

    /// `true` for [`SpanEvent::SpanException`].
    pub fn is_exception(&self) -> bool {
        matches!(self, SpanEvent::SpanException { .. })
    }

    /// The event's name, for [`SpanEvent::Message`]; `None` for exceptions
    /// (which have no name, only a fixed attribute set).
    pub fn name(&self) -> Option<&str> {
        match self {
            SpanEvent::Message { name, .. } => Some(name),
            SpanEvent::SpanException { .. } => None,
        }
    }
}

/// A structured record of one logical LLM call.
///
/// Constructed via [`Span::start`], mutated only by the interceptor or
/// accumulator that owns it, and finalized exactly once via [`Span::finish`].
/// After `finish` returns, nothing further should be mutated; callers that
/// need to enforce this at the type level can wrap the span in their own
/// completed-span newtype, but the core stops touching it once handed to a
/// [`Tracer`](crate::instrumentation::tracer::Tracer).
#[derive(Debug, Clone)]
pub struct Span {
    /// Fixed operation label; always [`LLM_SPAN_NAME`].
    pub name: String,
    /// The kind of operation this span describes.
    pub span_kind: SpanKind,
    /// When the call began.
    pub start_time: DateTime<Utc>,
    /// When the call (or stream) finished. Equal to `start_time` until
    /// [`Span::finish`] is called.
    pub end_time: DateTime<Utc>,
    /// `OK` | `ERROR` | `UNSET`.
    pub status_code: StatusCode,
    /// Empty on success; the exception's message on error.
    pub status_message: String,
    /// Semantic-key → JSON value attributes.
    pub attributes: AttributeMap,
    /// Ordered, append-only sequence of events.
    pub events: Vec<SpanEvent>,
    /// Trace/span/parent identifiers.
    pub context: SpanContext,
}

impl Span {
    /// Start a new, unfinished LLM span at `start_time`.
    pub fn start(span_kind: SpanKind, start_time: DateTime<Utc>) -> Self {
        Span {
            name: LLM_SPAN_NAME.to_string(),
            span_kind,
            start_time,
            end_time: start_time,
            status_code: StatusCode::Unset,
            status_message: String::new(),
            attributes: AttributeMap::new(),
            events: Vec::new(),
            context: SpanContext::new_root(),
        }
    }

    /// Merge `attributes` into the span's attribute map, in order.
    pub fn extend_attributes(&mut self, attributes: AttributeMap) {
        self.attributes.extend(attributes);
    }

    /// Append an event. Order is observable and callers are responsible for
    /// respecting the "first-token precedes exception" ordering guarantee.
    pub fn push_event(&mut self, event: SpanEvent) {
        self.events.push(event);
    }

    /// Finalize the span as successful.
    ///
    /// `end_time` is clamped to be no earlier than `start_time`, preserving
    /// the `start_time <= end_time` invariant even if a caller supplies a
    /// clock that appears to have gone backwards.
    pub fn finish_ok(&mut self, end_time: DateTime<Utc>) {
        self.status_code = StatusCode::Ok;
        self.status_message = String::new();
        self.end_time = end_time.max(self.start_time);
    }

    /// Finalize the span as failed. `message` becomes [`Span::status_message`];
    /// the caller must have already pushed a [`SpanEvent::SpanException`].
    pub fn finish_error(&mut self, message: impl Into<String>, end_time: DateTime<Utc>) {
        self.status_code = StatusCode::Error;
        self.status_message = message.into();
        self.end_time = end_time.max(self.start_time);
    }

    /// Finalize the span with an explicitly unset status. Used only by the
    /// optional early-close hook on a stream driver (`spec.md` §5,
    /// "Cancellation"); normal call paths always resolve to `OK` or `ERROR`.
    pub fn finish_unset(&mut self, end_time: DateTime<Utc>) {
        self.status_code = StatusCode::Unset;
        self.end_time = end_time.max(self.start_time);
    }
}
