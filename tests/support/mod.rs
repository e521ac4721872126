//! Shared test doubles for the instrumentation integration tests.
//!
//! Stands in for the respx-mocked `httpx` transport the original Python
//! instrumentor's test suite drives: rather than faking HTTP, these mock
//! clients implement the crate's own `ChatCompletionClient`/
//! `AsyncChatCompletionClient` traits directly and hand back pre-scripted
//! outcomes, one per call.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use llm_instrumentor::instrumentation::client::{
    AsyncChatCompletionClient, AsyncChatCompletionOutcome, ChatCompletionClient,
    ChatCompletionOutcome, ChunkResult, ClientError, RawChatCompletionResponse,
};
use llm_instrumentor::instrumentation::types::{ChatCompletionChunk, ChatCompletionResponse, LegacyCompletionRequest};

/// One scripted result for a single `chat_completion` call.
pub enum MockOutcome {
    Message(ChatCompletionResponse),
    RawMessage(serde_json::Value),
    Stream(Vec<ChunkResult>),
    RawStream(Vec<ChunkResult>),
    Err(ClientError),
}

/// A blocking client that replays one scripted [`MockOutcome`] per call, in order.
///
/// Panics if `chat_completion` is called more times than outcomes were queued —
/// that mismatch always indicates a test bug rather than a legitimate scenario.
pub struct MockChatClient {
    outcomes: Mutex<VecDeque<MockOutcome>>,
    completion_reply: String,
}

impl MockChatClient {
    pub fn new(outcomes: Vec<MockOutcome>) -> Self {
        MockChatClient {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            completion_reply: "legacy completion reply".to_string(),
        }
    }
}

impl ChatCompletionClient for MockChatClient {
    fn chat_completion(
        &self,
        _request: llm_instrumentor::instrumentation::types::ChatCompletionRequest,
    ) -> Result<ChatCompletionOutcome, ClientError> {
        let outcome = self
            .outcomes
            .lock()
            .expect("mock outcomes mutex poisoned")
            .pop_front()
            .expect("MockChatClient called more times than outcomes were queued");
        Ok(match outcome {
            MockOutcome::Message(response) => ChatCompletionOutcome::Message(response),
            MockOutcome::RawMessage(body) => {
                ChatCompletionOutcome::RawMessage(RawChatCompletionResponse::new(body))
            }
            MockOutcome::Stream(chunks) => {
                ChatCompletionOutcome::Stream(Box::new(chunks.into_iter()))
            }
            MockOutcome::RawStream(chunks) => {
                ChatCompletionOutcome::RawStream(Box::new(chunks.into_iter()))
            }
            MockOutcome::Err(error) => return Err(error),
        })
    }

    fn completion(&self, _request: LegacyCompletionRequest) -> Result<String, ClientError> {
        Ok(self.completion_reply.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The suspending counterpart to [`MockChatClient`], scripted identically.
pub struct MockAsyncChatClient {
    outcomes: Mutex<VecDeque<MockOutcome>>,
    completion_reply: String,
}

impl MockAsyncChatClient {
    pub fn new(outcomes: Vec<MockOutcome>) -> Self {
        MockAsyncChatClient {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            completion_reply: "legacy completion reply".to_string(),
        }
    }
}

#[async_trait]
impl AsyncChatCompletionClient for MockAsyncChatClient {
    async fn chat_completion(
        &self,
        _request: llm_instrumentor::instrumentation::types::ChatCompletionRequest,
    ) -> Result<AsyncChatCompletionOutcome, ClientError> {
        let outcome = self
            .outcomes
            .lock()
            .expect("mock outcomes mutex poisoned")
            .pop_front()
            .expect("MockAsyncChatClient called more times than outcomes were queued");
        Ok(match outcome {
            MockOutcome::Message(response) => AsyncChatCompletionOutcome::Message(response),
            MockOutcome::RawMessage(body) => {
                AsyncChatCompletionOutcome::RawMessage(RawChatCompletionResponse::new(body))
            }
            MockOutcome::Stream(chunks) => {
                AsyncChatCompletionOutcome::Stream(Box::pin(tokio_stream::iter(chunks)))
            }
            MockOutcome::RawStream(chunks) => {
                AsyncChatCompletionOutcome::RawStream(Box::pin(tokio_stream::iter(chunks)))
            }
            MockOutcome::Err(error) => return Err(error),
        })
    }

    async fn completion(&self, _request: LegacyCompletionRequest) -> Result<String, ClientError> {
        Ok(self.completion_reply.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Build a minimal single-choice, non-streaming response with plain text content.
pub fn text_response(content: &str) -> ChatCompletionResponse {
    use llm_instrumentor::instrumentation::types::{ChatMessage, Choice, Usage};
    ChatCompletionResponse {
        id: Some("chatcmpl-mock".to_string()),
        object: Some("chat.completion".to_string()),
        created: Some(0),
        model: Some("gpt-4".to_string()),
        choices: vec![Choice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content: Some(content.to_string()),
                name: None,
                function_call: None,
                tool_calls: None,
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

/// Build a content-delta chunk sequence that aggregates to `full_text`, split
/// one character at a time, headed by a role-only chunk.
pub fn text_chunks(full_text: &str) -> Vec<ChunkResult> {
    use llm_instrumentor::instrumentation::types::{ChunkChoice, Delta};
    let mut chunks = vec![Ok(ChatCompletionChunk {
        id: Some("chatcmpl-mock".to_string()),
        object: Some("chat.completion.chunk".to_string()),
        created: Some(0),
        model: Some("gpt-4".to_string()),
        choices: vec![ChunkChoice {
            index: 0,
            delta: Delta {
                role: Some("assistant".to_string()),
                ..Default::default()
            },
            finish_reason: None,
        }],
    })];
    for ch in full_text.chars() {
        chunks.push(Ok(ChatCompletionChunk {
            id: Some("chatcmpl-mock".to_string()),
            object: Some("chat.completion.chunk".to_string()),
            created: Some(0),
            model: Some("gpt-4".to_string()),
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta {
                    content: Some(ch.to_string()),
                    ..Default::default()
                },
                finish_reason: None,
            }],
        }));
    }
    chunks.push(Ok(ChatCompletionChunk {
        id: Some("chatcmpl-mock".to_string()),
        object: Some("chat.completion.chunk".to_string()),
        created: Some(0),
        model: Some("gpt-4".to_string()),
        choices: vec![ChunkChoice {
            index: 0,
            delta: Delta::default(),
            finish_reason: Some("stop".to_string()),
        }],
    }));
    chunks
}
