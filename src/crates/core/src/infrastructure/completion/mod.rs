//! Structured completion client
//!
//! The pipeline treats the LLM as an opaque service that, given a system
//! prompt, an input and a JSON schema, returns a schema-conformant object.
//! Every call site must survive the service failing or returning a shape
//! that does not parse.

mod openai;

use async_trait::async_trait;
use serde_json::Value;

use crate::util::errors::{AriaError, AriaResult};
use aria_core_types::ConversationTurn;

pub use openai::HttpCompletionClient;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub input: String,
    /// JSON schema the response must conform to.
    pub schema: Value,
    pub history: Option<Vec<ConversationTurn>>,
    pub model: Option<String>,
    /// Identifies the pipeline stage making the call, for logs and tests.
    pub caller_id: Option<String>,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, input: impl Into<String>, schema: Value) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            input: input.into(),
            schema,
            history: None,
            model: None,
            caller_id: None,
        }
    }

    pub fn with_caller(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = Some(caller_id.into());
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the parsed JSON object, or `AriaError::Upstream` for any
    /// provider or shape failure.
    async fn complete(&self, request: CompletionRequest) -> AriaResult<Value>;
}

/// Extract the outermost JSON object from possibly noisy model output.
pub fn extract_json_object(text: &str) -> AriaResult<&str> {
    let start = text
        .find('{')
        .ok_or_else(|| AriaError::upstream("completion output did not contain a JSON object"))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| AriaError::upstream("completion output did not contain a JSON object end"))?;
    if end < start {
        return Err(AriaError::upstream("completion output JSON braces are unbalanced"));
    }
    Ok(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_object_strips_noise() {
        let noisy = "Sure! Here is the JSON:\n{\"a\": 1}\nHope that helps.";
        assert_eq!(extract_json_object(noisy).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn extract_json_object_rejects_plain_text() {
        assert!(extract_json_object("no json here").is_err());
    }
}
