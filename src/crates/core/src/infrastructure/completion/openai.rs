use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{extract_json_object, CompletionClient, CompletionRequest};
use crate::util::errors::{AriaError, AriaResult};
use aria_core_types::Role;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Completion client for an OpenAI-compatible `/chat/completions` endpoint
/// running in JSON mode. The schema is embedded in the system prompt and the
/// response content is brace-scanned before parsing, since providers wrap
/// JSON in prose often enough that trusting raw content is not an option.
pub struct HttpCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl HttpCompletionClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn build_messages(&self, request: &CompletionRequest) -> Vec<ChatMessage> {
        let schema_text = serde_json::to_string_pretty(&request.schema)
            .unwrap_or_else(|_| request.schema.to_string());

        let mut messages = vec![ChatMessage {
            role: "system",
            content: format!(
                "{}\n\nOutput STRICT JSON ONLY (no markdown, no commentary) conforming to this schema:\n{}",
                request.system_prompt, schema_text
            ),
        }];

        if let Some(history) = &request.history {
            for turn in history {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::System => "system",
                };
                messages.push(ChatMessage {
                    role,
                    content: turn.text(),
                });
            }
        }

        messages.push(ChatMessage {
            role: "user",
            content: request.input.clone(),
        });

        messages
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> AriaResult<Value> {
        let caller = request.caller_id.clone().unwrap_or_else(|| "unknown".to_string());
        let body = ChatRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: self.build_messages(&request),
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("Completion call: caller={}, model={}", caller, body.model);

        let mut req = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| AriaError::upstream(format!("completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(
                "Completion provider error: caller={}, status={}, body={}",
                caller,
                status,
                crate::util::text::truncate(&detail, 200)
            );
            return Err(AriaError::upstream(format!(
                "completion provider returned {}",
                status
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AriaError::upstream(format!("completion response did not parse: {}", e)))?;

        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| AriaError::upstream("completion response had no content"))?;

        let json_str = extract_json_object(content)?;
        serde_json::from_str(json_str)
            .map_err(|e| AriaError::upstream(format!("completion content was not valid JSON: {}", e)))
    }
}
