//! Shared helpers for turning a [`ClientError`] into a [`SpanEvent::SpanException`].
//!
//! Used identically by both stream drivers and both interceptor variants so
//! that a blocking call and a suspending call raising the same error produce
//! indistinguishable exception events (`spec.md` §4.3: "Both MUST produce
//! indistinguishable spans for identical inputs").

use chrono::{DateTime, Utc};

use crate::instrumentation::client::ClientError;
use crate::instrumentation::span::SpanEvent;

/// Build the [`SpanEvent::SpanException`] event recorded for `error`.
///
/// The stacktrace always begins with the literal line
/// `"Traceback (most recent call last):"`, which is the substring consumers
/// are specified to look for (`spec.md` §7). A real backtrace is appended
/// when one is available (i.e. `RUST_BACKTRACE` is set); otherwise the line
/// alone still satisfies the contract.
pub fn exception_event(error: &ClientError, timestamp: DateTime<Utc>) -> SpanEvent {
    SpanEvent::exception(
        error.kind_name(),
        error.message(),
        stacktrace_for(error),
        timestamp,
    )
}

fn stacktrace_for(error: &ClientError) -> String {
    let backtrace = std::backtrace::Backtrace::capture();
    format!(
        "Traceback (most recent call last):\n{backtrace}\n{}: {}",
        error.kind_name(),
        error.message()
    )
}
