#[path = "support/mod.rs"]
mod support;

use std::sync::Arc;

use futures_util::StreamExt;
use indexmap::IndexMap;
use llm_instrumentor::instrumentation::client::{
    AsyncChatCompletionClient, AsyncChatCompletionOutcome, ClientError,
};
use llm_instrumentor::instrumentation::interceptor::asynchronous::Interceptor;
use llm_instrumentor::instrumentation::semantic_conventions::*;
use llm_instrumentor::instrumentation::types::{ChatCompletionRequest, ChatMessage, LegacyCompletionRequest};
use llm_instrumentor::{Instrumentor, StatusCode, Tracer};

use support::{text_chunks, text_response, MockAsyncChatClient, MockOutcome};

fn request(model: &str, messages: Vec<ChatMessage>, extra: Vec<(&str, serde_json::Value)>) -> ChatCompletionRequest {
    let mut map = IndexMap::new();
    for (key, value) in extra {
        map.insert(key.to_string(), value);
    }
    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        extra: map,
    }
}

fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: "user".to_string(),
        content: Some(content.to_string()),
        name: None,
        function_call: None,
        tool_calls: None,
    }
}

#[tokio::test]
async fn chat_success_records_one_ok_span() {
    let tracer = Tracer::new();
    let inner = Arc::new(MockAsyncChatClient::new(vec![MockOutcome::Message(text_response(
        "France won the World Cup in 2018.",
    ))]));
    let interceptor = Interceptor::new(inner, tracer.clone());

    let outcome = interceptor
        .chat_completion(request(
            "gpt-4",
            vec![user_message("Who won the World Cup in 2018?")],
            vec![("temperature", serde_json::json!(0.23))],
        ))
        .await
        .unwrap();
    match outcome {
        AsyncChatCompletionOutcome::Message(response) => {
            assert!(response.choices[0]
                .message
                .content
                .as_ref()
                .unwrap()
                .to_lowercase()
                .contains("france"));
        }
        _ => panic!("expected a parsed message outcome"),
    }

    assert_eq!(tracer.len(), 1);
    let span = &tracer.get_spans()[0];
    assert_eq!(span.status_code, StatusCode::Ok);
    assert!(span.events.is_empty());
}

#[tokio::test]
async fn auth_error_propagates_and_records_exception_event() {
    let tracer = Tracer::new();
    let inner = Arc::new(MockAsyncChatClient::new(vec![MockOutcome::Err(
        ClientError::Authentication {
            message: "error-message".to_string(),
        },
    )]));
    let interceptor = Interceptor::new(inner, tracer.clone());

    let err = interceptor
        .chat_completion(request("gpt-4", vec![user_message("hi")], vec![]))
        .await
        .expect_err("auth failure must propagate");
    assert!(matches!(err, ClientError::Authentication { .. }));

    let span = &tracer.get_spans()[0];
    assert_eq!(span.status_code, StatusCode::Error);
    let exceptions: Vec<_> = span.events.iter().filter(|e| e.is_exception()).collect();
    assert_eq!(exceptions.len(), 1);
}

#[tokio::test]
async fn non_chat_completion_produces_no_span() {
    let tracer = Tracer::new();
    let inner = Arc::new(MockAsyncChatClient::new(vec![]));
    let instrumentor = Instrumentor::new(tracer.clone());
    let client = instrumentor.instrument_async(inner);

    let reply = client
        .completion(LegacyCompletionRequest {
            model: "gpt-3.5-turbo-instruct".to_string(),
            prompt: "complete this".to_string(),
            extra: IndexMap::new(),
        })
        .await
        .unwrap();
    assert_eq!(reply, "legacy completion reply");
    assert!(tracer.is_empty());
}

#[tokio::test]
async fn instrument_async_is_idempotent_across_repeated_installs() {
    let tracer = Tracer::new();
    let inner: Arc<dyn AsyncChatCompletionClient> = Arc::new(MockAsyncChatClient::new(vec![
        MockOutcome::Message(text_response("hello")),
    ]));
    let instrumentor = Instrumentor::new(tracer.clone());

    let once = instrumentor.instrument_async(inner);
    let twice = instrumentor.instrument_async(once.clone());
    let thrice = instrumentor.instrument_async(twice.clone());

    thrice
        .chat_completion(request("gpt-4", vec![user_message("hi")], vec![]))
        .await
        .unwrap();
    assert_eq!(tracer.len(), 1);
}

#[tokio::test]
async fn streaming_success_aggregates_content_and_records_first_token_event() {
    let tracer = Tracer::new();
    let chunks = text_chunks("France won the World Cup in 2018.");
    let inner = Arc::new(MockAsyncChatClient::new(vec![MockOutcome::Stream(chunks)]));
    let interceptor = Interceptor::new(inner, tracer.clone());

    let outcome = interceptor
        .chat_completion(request(
            "gpt-4",
            vec![user_message("Who won the World Cup in 2018?")],
            vec![("stream", serde_json::json!(true))],
        ))
        .await
        .unwrap();
    let mut stream = match outcome {
        AsyncChatCompletionOutcome::Stream(stream) => stream,
        _ => panic!("expected a stream outcome"),
    };

    assert!(tracer.is_empty());
    let mut count = 0;
    while let Some(chunk) = stream.next().await {
        chunk.unwrap();
        count += 1;
    }
    let full_text = "France won the World Cup in 2018.";
    assert_eq!(count, full_text.chars().count() + 2);

    assert_eq!(tracer.len(), 1);
    let span = &tracer.get_spans()[0];
    assert_eq!(span.status_code, StatusCode::Ok);
    let output_messages = span.attributes[LLM_OUTPUT_MESSAGES].as_array().unwrap();
    assert_eq!(
        output_messages[0][MESSAGE_CONTENT],
        serde_json::json!("France won the World Cup in 2018.")
    );
    let first_token_events: Vec<_> = span
        .events
        .iter()
        .filter(|e| e.name().map(|n| n.to_lowercase().contains("first token")).unwrap_or(false))
        .collect();
    assert_eq!(first_token_events.len(), 1);
}

#[tokio::test]
async fn streaming_midstream_fault_preserves_partial_aggregation() {
    let tracer = Tracer::new();
    let mut chunks = text_chunks("partial");
    chunks.truncate(3);
    chunks.push(Err(ClientError::Transport {
        message: "connection reset".to_string(),
    }));
    let inner = Arc::new(MockAsyncChatClient::new(vec![MockOutcome::Stream(chunks)]));
    let interceptor = Interceptor::new(inner, tracer.clone());

    let outcome = interceptor
        .chat_completion(request(
            "gpt-4",
            vec![user_message("hi")],
            vec![("stream", serde_json::json!(true))],
        ))
        .await
        .unwrap();
    let mut stream = match outcome {
        AsyncChatCompletionOutcome::Stream(stream) => stream,
        _ => panic!("expected a stream outcome"),
    };
    let mut saw_error = false;
    while let Some(chunk) = stream.next().await {
        if chunk.is_err() {
            saw_error = true;
        }
    }
    assert!(saw_error);

    assert_eq!(tracer.len(), 1);
    let span = &tracer.get_spans()[0];
    assert_eq!(span.status_code, StatusCode::Error);
    let exceptions: Vec<_> = span.events.iter().filter(|e| e.is_exception()).collect();
    assert_eq!(exceptions.len(), 1);
    assert!(span.attributes[LLM_OUTPUT_MESSAGES].as_array().unwrap()[0][MESSAGE_CONTENT]
        .as_str()
        .unwrap()
        .len()
        > 0);
}

#[tokio::test]
async fn raw_message_response_is_parsed_for_output_attributes() {
    let tracer = Tracer::new();
    let body = serde_json::json!({
        "id": "chatcmpl-raw",
        "object": "chat.completion",
        "created": 0,
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "raw response content"},
            "finish_reason": "stop",
        }],
        "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7},
    });
    let inner = Arc::new(MockAsyncChatClient::new(vec![MockOutcome::RawMessage(body)]));
    let interceptor = Interceptor::new(inner, tracer.clone());

    let outcome = interceptor
        .chat_completion(request("gpt-4", vec![user_message("hi")], vec![]))
        .await
        .unwrap();
    match outcome {
        AsyncChatCompletionOutcome::RawMessage(raw) => {
            assert_eq!(raw.raw_body()["id"].as_str().unwrap(), "chatcmpl-raw");
        }
        _ => panic!("expected a raw message outcome"),
    }

    assert_eq!(tracer.len(), 1);
    let span = &tracer.get_spans()[0];
    assert_eq!(span.status_code, StatusCode::Ok);
    let output_messages = span.attributes[LLM_OUTPUT_MESSAGES].as_array().unwrap();
    assert_eq!(
        output_messages[0][MESSAGE_CONTENT],
        serde_json::json!("raw response content")
    );
}

#[tokio::test]
async fn closing_a_stream_early_finalizes_with_unset_status() {
    use llm_instrumentor::instrumentation::stream::asynchronous::InstrumentedStream;
    use llm_instrumentor::{Span, SpanKind};

    let tracer = Tracer::new();
    let chunks = text_chunks("closed early");
    let span = Span::start(SpanKind::Llm, chrono::Utc::now());
    let req = request(
        "gpt-4",
        vec![user_message("hi")],
        vec![("stream", serde_json::json!(true))],
    );
    let mut stream = InstrumentedStream::new(Box::pin(tokio_stream::iter(chunks)), span, tracer.clone(), req);

    // Pulling the first chunk already records the first-token event, so the
    // closed span carries both it and the close event, in that order.
    assert!(stream.next().await.is_some());
    assert!(tracer.is_empty());

    stream.close();
    assert_eq!(tracer.len(), 1);
    let span = &tracer.get_spans()[0];
    assert_eq!(span.status_code, StatusCode::Unset);
    assert_eq!(span.events.len(), 2);
    assert_eq!(span.events[0].name(), Some("First Token Stream Event"));
    assert_eq!(span.events[1].name(), Some("Stream Closed Early"));
}
