//! The Instrumentor: idempotently rewires a client's chat-completion entry
//! point through the Call Interceptor (`spec.md` §4.4).
//!
//! Rust has no supported way to replace a method on an existing trait object
//! in place, so installation here takes the Design Notes' first suggested
//! strategy literally: a wrapping decorator constructed around the original
//! client. Idempotency is still enforced the way the spec requires — by a
//! sentinel identifying the replacement, not by instrumentor identity — via
//! a downcast check rather than a mutable flag on a monkey-patched method.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::instrumentation::client::{
    AsyncChatCompletionClient, AsyncChatCompletionOutcome, ChatCompletionClient,
    ChatCompletionOutcome, ClientError,
};
use crate::instrumentation::interceptor::{asynchronous, blocking};
use crate::instrumentation::tracer::Tracer;
use crate::instrumentation::types::{ChatCompletionRequest, LegacyCompletionRequest};

/// The blocking instrumented wrapper produced by [`Instrumentor::instrument`].
///
/// Its presence behind an `Arc<dyn ChatCompletionClient>` is itself the
/// idempotency sentinel: [`Instrumentor::instrument`] checks for it via
/// [`ChatCompletionClient::as_any`] before wrapping again.
pub struct InstrumentedClient {
    interceptor: blocking::Interceptor,
}

impl ChatCompletionClient for InstrumentedClient {
    fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionOutcome, ClientError> {
        self.interceptor.chat_completion(request)
    }

    fn completion(&self, request: LegacyCompletionRequest) -> Result<String, ClientError> {
        // Legacy (non-chat) endpoint: untouched pass-through, no span.
        self.interceptor.inner().completion(request)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The suspending instrumented wrapper produced by [`Instrumentor::instrument_async`].
pub struct AsyncInstrumentedClient {
    interceptor: asynchronous::Interceptor,
}

#[async_trait]
impl AsyncChatCompletionClient for AsyncInstrumentedClient {
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<AsyncChatCompletionOutcome, ClientError> {
        self.interceptor.chat_completion(request).await
    }

    async fn completion(&self, request: LegacyCompletionRequest) -> Result<String, ClientError> {
        // Legacy (non-chat) endpoint: untouched pass-through, no span.
        self.interceptor.inner().completion(request).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Installs the Call Interceptor in front of a client.
///
/// One `Instrumentor` owns the `Tracer` spans are recorded to; the only
/// observable configuration the core exposes is which `Tracer` is passed
/// here (`spec.md` §6).
#[derive(Clone)]
pub struct Instrumentor {
    tracer: Tracer,
}

impl Instrumentor {
    /// Build an instrumentor that records finished spans to `tracer`.
    pub fn new(tracer: Tracer) -> Self {
        Instrumentor { tracer }
    }

    /// The tracer this instrumentor records to.
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Install the blocking interceptor in front of `client`.
    ///
    /// A no-op if `client` is already an [`InstrumentedClient`]: the same
    /// `Arc` is returned unchanged rather than nesting a second wrapper,
    /// regardless of which `Instrumentor` (or `Tracer`) performed the first
    /// installation.
    pub fn instrument(&self, client: Arc<dyn ChatCompletionClient>) -> Arc<dyn ChatCompletionClient> {
        if client.as_any().downcast_ref::<InstrumentedClient>().is_some() {
            return client;
        }
        Arc::new(InstrumentedClient {
            interceptor: blocking::Interceptor::new(client, self.tracer.clone()),
        })
    }

    /// Install the suspending interceptor in front of `client`. See
    /// [`Instrumentor::instrument`] for the idempotency contract.
    pub fn instrument_async(
        &self,
        client: Arc<dyn AsyncChatCompletionClient>,
    ) -> Arc<dyn AsyncChatCompletionClient> {
        if client.as_any().downcast_ref::<AsyncInstrumentedClient>().is_some() {
            return client;
        }
        Arc::new(AsyncInstrumentedClient {
            interceptor: asynchronous::Interceptor::new(client, self.tracer.clone()),
        })
    }

    /// Restore the original binding, clearing the sentinel. A no-op
    /// (returns `client` unchanged) if `client` was never instrumented.
    pub fn uninstall(&self, client: Arc<dyn ChatCompletionClient>) -> Arc<dyn ChatCompletionClient> {
        match client.as_any().downcast_ref::<InstrumentedClient>() {
            Some(instrumented) => instrumented.interceptor.inner().clone(),
            None => client,
        }
    }

    /// Async counterpart to [`Instrumentor::uninstall`].
    pub fn uninstall_async(
        &self,
        client: Arc<dyn AsyncChatCompletionClient>,
    ) -> Arc<dyn AsyncChatCompletionClient> {
        match client.as_any().downcast_ref::<AsyncInstrumentedClient>() {
            Some(instrumented) => instrumented.interceptor.inner().clone(),
            None => client,
        }
    }
}
