//! The pure, non-blocking aggregation engine shared by the blocking and
//! suspending stream drivers (`spec.md` §4.2, Design Notes "dual sync/async
//! duplication").
//!
//! `Accumulator` has no knowledge of `Iterator`, `Stream`, or any I/O
//! primitive — it only knows how to fold one decoded [`ChatCompletionChunk`]
//! at a time into running state, and how to render that state into the
//! aggregated assistant message `spec.md` §4.2 describes. The two drivers in
//! [`crate::instrumentation::stream`] are the only things that know how to
//! *pull* a chunk.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::instrumentation::semantic_conventions::*;
use crate::instrumentation::types::ChatCompletionChunk;

#[derive(Debug, Default)]
struct ToolCallState {
    id: Option<String>,
    kind: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Accumulated state reconstructed from a sequence of delta chunks.
#[derive(Debug, Default)]
pub struct Accumulator {
    role: Option<String>,
    content: Option<String>,
    function_call_name: Option<String>,
    function_call_arguments: Option<String>,
    tool_calls: BTreeMap<u32, ToolCallState>,
    raw_chunks: Vec<Value>,
}

impl Accumulator {
    /// A fresh accumulator with no observed chunks.
    pub fn new() -> Self {
        Accumulator::default()
    }

    /// Fold one chunk into the running state and record its raw JSON body.
    ///
    /// Mirrors `spec.md` §4.2's per-chunk aggregation rules exactly: `role`
    /// is set the first time it appears, `content` is appended, the
    /// function-call name is set on first sight and its arguments are
    /// appended, and `tool_calls` entries are upserted by their `index`. The
    /// final array is always rendered in ascending `index` order regardless
    /// of the order partial deltas for each entry happened to arrive in.
    pub fn observe(&mut self, chunk: &ChatCompletionChunk) {
        self.raw_chunks
            .push(serde_json::to_value(chunk).unwrap_or(Value::Null));

        let Some(choice) = chunk.choices.first() else {
            return;
        };
        let delta = &choice.delta;

        if let Some(role) = &delta.role {
            self.role = Some(role.clone());
        }
        if let Some(content) = &delta.content {
            self.content.get_or_insert_with(String::new).push_str(content);
        }
        if let Some(function_call) = &delta.function_call {
            if let Some(name) = &function_call.name {
                self.function_call_name = Some(name.clone());
            }
            if let Some(arguments) = &function_call.arguments {
                self.function_call_arguments
                    .get_or_insert_with(String::new)
                    .push_str(arguments);
            }
        }
        if let Some(tool_calls) = &delta.tool_calls {
            for partial in tool_calls {
                let entry = self.tool_calls.entry(partial.index).or_default();
                if let Some(id) = &partial.id {
                    entry.id = Some(id.clone());
                }
                if let Some(kind) = &partial.kind {
                    entry.kind = Some(kind.clone());
                }
                if let Some(function) = &partial.function {
                    if let Some(name) = &function.name {
                        entry.name = Some(name.clone());
                    }
                    if let Some(arguments) = &function.arguments {
                        entry.arguments.push_str(arguments);
                    }
                }
            }
        }
    }

    /// The raw JSON body of every chunk observed so far, in arrival order.
    pub fn raw_chunks(&self) -> &[Value] {
        &self.raw_chunks
    }

    /// `true` once at least one chunk has been observed.
    pub fn has_observed_any(&self) -> bool {
        !self.raw_chunks.is_empty()
    }

    /// Render the aggregated assistant message, emitting exactly the fields
    /// that were populated, keyed by the semantic-convention message keys so
    /// the result can be dropped directly into the output-messages attribute.
    pub fn aggregated_message(&self) -> Value {
        let mut object: IndexMap<String, Value> = IndexMap::new();
        object.insert(
            MESSAGE_ROLE.to_string(),
            Value::from(self.role.clone().unwrap_or_else(|| "assistant".to_string())),
        );
        if let Some(content) = &self.content {
            object.insert(MESSAGE_CONTENT.to_string(), Value::from(content.as_str()));
        }
        if let Some(name) = &self.function_call_name {
            object.insert(MESSAGE_FUNCTION_CALL_NAME.to_string(), Value::from(name.as_str()));
        }
        if let Some(arguments) = &self.function_call_arguments {
            object.insert(
                MESSAGE_FUNCTION_CALL_ARGUMENTS_JSON.to_string(),
                Value::from(arguments.as_str()),
            );
        }
        if !self.tool_calls.is_empty() {
            let entries: Vec<Value> = self
                .tool_calls
                .values()
                .map(|tool_call| {
                    let mut tool_object: IndexMap<String, Value> = IndexMap::new();
                    tool_object.insert(
                        TOOL_CALL_FUNCTION_NAME.to_string(),
                        Value::from(tool_call.name.clone().unwrap_or_default()),
                    );
                    tool_object.insert(
                        TOOL_CALL_FUNCTION_ARGUMENTS_JSON.to_string(),
                        Value::from(tool_call.arguments.clone()),
                    );
                    Value::Object(tool_object.into_iter().collect())
                })
                .collect();
            object.insert(MESSAGE_TOOL_CALLS.to_string(), Value::Array(entries));
        }
        Value::Object(object.into_iter().collect())
    }
}
