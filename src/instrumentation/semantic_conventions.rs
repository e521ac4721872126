//! Frozen namespace of attribute keys used by [`Span::attributes`](crate::instrumentation::span::Span).
//!
//! These strings are the wire contract with downstream consumers of recorded
//! spans and MUST NOT be renamed across versions.

/// The LLM's input messages, as a JSON array of message objects.
pub const LLM_INPUT_MESSAGES: &str = "llm.input_messages";
/// The LLM's output messages (the assistant turn(s) produced by the call).
pub const LLM_OUTPUT_MESSAGES: &str = "llm.output_messages";
/// Canonical JSON of the recognized invocation parameters sent to the model.
pub const LLM_INVOCATION_PARAMETERS: &str = "llm.invocation_parameters";
/// Top-level `{name, arguments}` object when the response is a single
/// function-call message not already present among the input messages.
pub const LLM_FUNCTION_CALL: &str = "llm.function_call";
/// Number of tokens spent on the prompt.
pub const LLM_TOKEN_COUNT_PROMPT: &str = "llm.token_count.prompt";
/// Number of tokens spent on the completion.
pub const LLM_TOKEN_COUNT_COMPLETION: &str = "llm.token_count.completion";
/// Total tokens (`prompt + completion`).
pub const LLM_TOKEN_COUNT_TOTAL: &str = "llm.token_count.total";

/// Logical input to the call, as a JSON string (mirrors [`LLM_INVOCATION_PARAMETERS`]).
pub const INPUT_VALUE: &str = "input.value";
/// MIME type of [`INPUT_VALUE`].
pub const INPUT_MIME_TYPE: &str = "input.mime_type";
/// Logical output of the call, as a JSON string (response body, or chunk array).
pub const OUTPUT_VALUE: &str = "output.value";
/// MIME type of [`OUTPUT_VALUE`].
pub const OUTPUT_MIME_TYPE: &str = "output.mime_type";

/// `application/json`, the only MIME type the core ever produces.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Message-object key: `"role"`.
pub const MESSAGE_ROLE: &str = "message.role";
/// Message-object key: `"content"`.
pub const MESSAGE_CONTENT: &str = "message.content";
/// Message-object key: `"name"`.
pub const MESSAGE_NAME: &str = "message.name";
/// Message-object key: the function name of a `function_call`.
pub const MESSAGE_FUNCTION_CALL_NAME: &str = "message.function_call_name";
/// Message-object key: the JSON-encoded arguments of a `function_call`.
pub const MESSAGE_FUNCTION_CALL_ARGUMENTS_JSON: &str = "message.function_call_arguments_json";
/// Message-object key: an ordered sequence of tool-call entries.
pub const MESSAGE_TOOL_CALLS: &str = "message.tool_calls";

/// Tool-call entry key: the called function's name.
pub const TOOL_CALL_FUNCTION_NAME: &str = "tool_call.function.name";
/// Tool-call entry key: the called function's JSON-encoded arguments.
pub const TOOL_CALL_FUNCTION_ARGUMENTS_JSON: &str = "tool_call.function.arguments_json";

/// Exception-event attribute key: the exception's type name.
pub const EXCEPTION_TYPE: &str = "exception.type";
/// Exception-event attribute key: the exception's message.
pub const EXCEPTION_MESSAGE: &str = "exception.message";
/// Exception-event attribute key: a textual stacktrace beginning with `"Traceback"`.
pub const EXCEPTION_STACKTRACE: &str = "exception.stacktrace";

/// Name given to the generic event recorded when a stream yields its first chunk.
pub const FIRST_TOKEN_STREAM_EVENT_NAME: &str = "First Token Stream Event";
/// Name given to the optional event recorded when a stream is closed before exhaustion.
pub const STREAM_CLOSED_EARLY_EVENT_NAME: &str = "Stream Closed Early";

/// Fixed `Span::name` for every span this crate emits.
pub const LLM_SPAN_NAME: &str = "llm";
