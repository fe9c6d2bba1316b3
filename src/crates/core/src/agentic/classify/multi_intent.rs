use async_trait::async_trait;
use log::warn;
use serde_json::json;

use super::{claim_with_plan, Detector, DetectorOutcome};
use crate::agentic::context::TurnContext;
use crate::agentic::planning::PlanKind;
use crate::infrastructure::completion::CompletionRequest;
use aria_core_types::Classification;

/// LLM-backed detection of queries that bundle more than one distinct
/// request. Single-token and very short queries are rejected without a
/// completion call.
pub struct MultiIntentDetector;

impl MultiIntentDetector {
    pub fn new() -> Self {
        Self
    }

    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "enum": ["single_intent", "multi_intent_complex", "ambiguous"]
                },
                "isMultiIntent": { "type": "boolean" },
                "intentCount": { "type": "integer", "minimum": 1 },
                "primaryIntent": { "type": "string" },
                "secondaryIntents": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["category", "primaryIntent"]
        })
    }
}

impl Default for MultiIntentDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for MultiIntentDetector {
    fn kind(&self) -> PlanKind {
        PlanKind::MultiIntent
    }

    async fn try_claim(&self, query: &str, ctx: &TurnContext) -> DetectorOutcome {
        let trimmed = query.trim();
        // A single token cannot bundle two requests.
        if trimmed.len() < ctx.config.min_multi_intent_len
            || !trimmed.contains(char::is_whitespace)
        {
            return DetectorOutcome::Declined;
        }

        let system_prompt = format!(
            r#"Classify whether the user's message bundles more than one distinct request.

User state: {state}
Persona: {persona}
Recent conversation:
{history}

Use category "multi_intent_complex" only when the message contains clearly
separable requests; count them in intentCount."#,
            state = ctx.user_state,
            persona = ctx.persona,
            history = ctx.history_summary,
        );

        let request = CompletionRequest::new(system_prompt, trimmed, Self::schema())
            .with_caller("multi_intent")
            .with_model(ctx.config.completion_model.clone());

        let value = match ctx.completion.complete(request).await {
            Ok(value) => value,
            Err(e) => {
                return DetectorOutcome::Failed {
                    reason: format!("classification call failed: {}", e),
                };
            }
        };

        let classification: Classification = match serde_json::from_value(value) {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Multi-intent classification did not match schema: {}", e);
                return DetectorOutcome::Failed {
                    reason: format!("classification shape mismatch: {}", e),
                };
            }
        };

        if !classification.multi_intent() {
            return DetectorOutcome::Declined;
        }

        claim_with_plan(self.kind(), trimmed, ctx).await
    }
}
