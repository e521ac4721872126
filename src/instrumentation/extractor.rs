//! Pure functions mapping a recognized request/response pair to span
//! attributes, per `spec.md` §4.1.
//!
//! Nothing here performs I/O or touches a [`Tracer`](crate::instrumentation::tracer::Tracer);
//! every function is a total, panic-free mapping from wire types to
//! [`AttributeMap`] entries, so a malformed upstream body can never crash the
//! caller (`spec.md` §7, "internal extraction errors").

use indexmap::IndexMap;
use serde_json::Value;

use crate::instrumentation::semantic_conventions::*;
use crate::instrumentation::span::AttributeMap;
use crate::instrumentation::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Build the JSON object a single [`ChatMessage`] is recorded as, using only
/// the semantic keys for fields that are actually populated.
pub fn message_to_attribute_object(message: &ChatMessage) -> Value {
    let mut object: IndexMap<String, Value> = IndexMap::new();
    object.insert(MESSAGE_ROLE.to_string(), Value::from(message.role.as_str()));
    if let Some(content) = &message.content {
        object.insert(MESSAGE_CONTENT.to_string(), Value::from(content.as_str()));
    }
    if let Some(name) = &message.name {
        object.insert(MESSAGE_NAME.to_string(), Value::from(name.as_str()));
    }
    if let Some(function_call) = &message.function_call {
        object.insert(
            MESSAGE_FUNCTION_CALL_NAME.to_string(),
            Value::from(function_call.name.as_str()),
        );
        object.insert(
            MESSAGE_FUNCTION_CALL_ARGUMENTS_JSON.to_string(),
            Value::from(function_call.arguments.as_str()),
        );
    }
    if let Some(tool_calls) = &message.tool_calls {
        let entries: Vec<Value> = tool_calls
            .iter()
            .map(|tool_call| {
                let mut tool_object: IndexMap<String, Value> = IndexMap::new();
                tool_object.insert(
                    TOOL_CALL_FUNCTION_NAME.to_string(),
                    Value::from(tool_call.function.name.as_str()),
                );
                tool_object.insert(
                    TOOL_CALL_FUNCTION_ARGUMENTS_JSON.to_string(),
                    Value::from(tool_call.function.arguments.as_str()),
                );
                Value::Object(tool_object.into_iter().collect())
            })
            .collect();
        object.insert(MESSAGE_TOOL_CALLS.to_string(), Value::Array(entries));
    }
    Value::Object(object.into_iter().collect())
}

/// Build the canonical invocation-parameters object: `model`, `messages`,
/// then every other recognized field in the order the request declared them.
fn invocation_parameters_object(request: &ChatCompletionRequest) -> Value {
    let mut object: IndexMap<String, Value> = IndexMap::new();
    object.insert("model".to_string(), Value::from(request.model.as_str()));
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(raw_request_message_json)
        .collect();
    object.insert("messages".to_string(), Value::Array(messages));
    for (key, value) in &request.extra {
        object.insert(key.clone(), value.clone());
    }
    Value::Object(object.into_iter().collect())
}

/// The literal JSON object for a request message (plain `role`/`content`
/// keys, as sent over the wire) — distinct from [`message_to_attribute_object`],
/// which uses the semantic-convention key names for the input-messages
/// attribute.
fn raw_request_message_json(message: &ChatMessage) -> Value {
    serde_json::to_value(message).unwrap_or(Value::Null)
}

/// Attributes derivable before the call is even made: input messages and
/// invocation parameters. Seeded onto the span at call entry.
pub fn input_attributes(request: &ChatCompletionRequest) -> AttributeMap {
    let mut attributes = AttributeMap::new();
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(message_to_attribute_object)
        .collect();
    attributes.insert(LLM_INPUT_MESSAGES.to_string(), Value::Array(messages));

    let params = invocation_parameters_object(request);
    let params_json = serde_json::to_string(&params).unwrap_or_default();
    attributes.insert(
        LLM_INVOCATION_PARAMETERS.to_string(),
        Value::from(params_json.clone()),
    );
    attributes.insert(INPUT_VALUE.to_string(), Value::from(params_json));
    attributes.insert(INPUT_MIME_TYPE.to_string(), Value::from(JSON_MIME_TYPE));
    attributes
}

/// `true` iff any input message is an assistant message that already carries
/// a `function_call`, per the "no prior assistant function-call message"
/// rule for the top-level [`LLM_FUNCTION_CALL`] attribute.
fn has_prior_assistant_function_call(request: &ChatCompletionRequest) -> bool {
    request
        .messages
        .iter()
        .any(|message| message.role == "assistant" && message.function_call.is_some())
}

/// Attributes derived from a fully parsed, non-streaming response.
pub fn response_attributes(
    request: &ChatCompletionRequest,
    response: &ChatCompletionResponse,
) -> AttributeMap {
    let mut attributes = AttributeMap::new();

    let output_messages: Vec<Value> = response
        .choices
        .iter()
        .map(|choice| message_to_attribute_object(&choice.message))
        .collect();
    attributes.insert(LLM_OUTPUT_MESSAGES.to_string(), Value::Array(output_messages));

    if response.choices.len() == 1 {
        if let Some(function_call) = &response.choices[0].message.function_call {
            if !has_prior_assistant_function_call(request) {
                let mut object: IndexMap<String, Value> = IndexMap::new();
                object.insert("name".to_string(), Value::from(function_call.name.as_str()));
                object.insert(
                    "arguments".to_string(),
                    Value::from(function_call.arguments.as_str()),
                );
                attributes.insert(
                    LLM_FUNCTION_CALL.to_string(),
                    Value::Object(object.into_iter().collect()),
                );
            }
        }
    }

    if let Some(usage) = &response.usage {
        attributes.insert(LLM_TOKEN_COUNT_PROMPT.to_string(), Value::from(usage.prompt_tokens));
        attributes.insert(
            LLM_TOKEN_COUNT_COMPLETION.to_string(),
            Value::from(usage.completion_tokens),
        );
        attributes.insert(LLM_TOKEN_COUNT_TOTAL.to_string(), Value::from(usage.total_tokens));
    }

    let output_json = serde_json::to_string(response).unwrap_or_default();
    attributes.insert(OUTPUT_VALUE.to_string(), Value::from(output_json));
    attributes.insert(OUTPUT_MIME_TYPE.to_string(), Value::from(JSON_MIME_TYPE));

    attributes
}

/// Attributes derived from a stream accumulation result: the aggregated
/// assistant message and the raw chunk bodies captured along the way.
///
/// `aggregated_message` is the JSON object the accumulator built from
/// populated fields only (`spec.md` §4.2, "Normal end"); `raw_chunks` are the
/// decoded chunk bodies in arrival order.
pub fn streaming_attributes(
    request: &ChatCompletionRequest,
    aggregated_message: &Value,
    raw_chunks: &[Value],
) -> AttributeMap {
    let mut attributes = AttributeMap::new();
    attributes.insert(
        LLM_OUTPUT_MESSAGES.to_string(),
        Value::Array(vec![aggregated_message.clone()]),
    );

    if let Some(object) = aggregated_message.as_object() {
        let name = object.get(MESSAGE_FUNCTION_CALL_NAME).and_then(Value::as_str);
        let arguments = object
            .get(MESSAGE_FUNCTION_CALL_ARGUMENTS_JSON)
            .and_then(Value::as_str);
        if let (Some(name), Some(arguments)) = (name, arguments) {
            if !has_prior_assistant_function_call(request) {
                let mut call: IndexMap<String, Value> = IndexMap::new();
                call.insert("name".to_string(), Value::from(name));
                call.insert("arguments".to_string(), Value::from(arguments));
                attributes.insert(LLM_FUNCTION_CALL.to_string(), Value::Object(call.into_iter().collect()));
            }
        }
    }

    let output_json = serde_json::to_string(&Value::Array(raw_chunks.to_vec())).unwrap_or_default();
    attributes.insert(OUTPUT_VALUE.to_string(), Value::from(output_json));
    attributes.insert(OUTPUT_MIME_TYPE.to_string(), Value::from(JSON_MIME_TYPE));
    attributes
}
