//! The Call Interceptor: wraps the chat-completion entry point in both
//! blocking and suspending variants (`spec.md` §4.3).

pub mod asynchronous;
pub mod blocking;
pub(crate) mod core;
