//! Intent disambiguation
//!
//! Resolves pronouns and implicit references in the latest user turn against
//! conversation history and the user profile. Disambiguation is an
//! optimization, never a hard dependency: every failure path returns `None`
//! and downstream stages continue with the original query.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::{json, Value};

use crate::agentic::context::{format_history, user_state_summary};
use crate::config::OrchestratorConfig;
use crate::infrastructure::completion::{CompletionClient, CompletionRequest};
use crate::util::text::cap_block;
use aria_core_types::{ConversationTurn, DisambiguationResult, ExtractedEntity, UserProfile};

/// Queries matching these never carry references worth resolving.
const TRIVIAL_ACKS: &[&str] = &[
    "yes", "no", "ok", "okay", "hi", "hey", "hello", "thanks", "thank you", "bye", "goodbye",
    "sure", "cool", "great", "nice", "yep", "nope",
];

/// Tokens that mark a history turn as date-bearing when an extracted entity
/// has type `date`.
const DATE_TOKENS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january",
    "february", "march", "april", "may", "june", "july", "august", "september", "october",
    "november", "december", "today", "tonight", "yesterday", "tomorrow", "next week", "last week",
    "next month", "last month",
];

pub struct Disambiguator {
    completion: Arc<dyn CompletionClient>,
    config: Arc<OrchestratorConfig>,
}

impl Disambiguator {
    pub fn new(completion: Arc<dyn CompletionClient>, config: Arc<OrchestratorConfig>) -> Self {
        Self { completion, config }
    }

    /// Resolve references in `query`. Returns `None` for trivial queries and
    /// for every completion failure.
    pub async fn disambiguate(
        &self,
        query: &str,
        history: &[ConversationTurn],
        profile: Option<&UserProfile>,
    ) -> Option<DisambiguationResult> {
        let trimmed = query.trim();
        if trimmed.len() < self.config.min_disambiguation_len
            || TRIVIAL_ACKS.contains(&trimmed.to_lowercase().as_str())
        {
            debug!("Disambiguation skipped for trivial query");
            return None;
        }

        let context = self.build_context(history, profile);
        let system_prompt = format!(
            r#"You resolve pronouns, demonstratives and implied references in the user's latest message.

Conversation context:
{context}

Rewrite the message so every reference is explicit. Report the entities you
found, what each reference resolved to, and the user's true intent. If the
message contains no references, return it unchanged as resolvedQuery."#
        );

        let request = CompletionRequest::new(system_prompt, trimmed, Self::schema())
            .with_caller("disambiguation")
            .with_model(self.config.completion_model.clone());

        let value = match self.completion.complete(request).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Disambiguation failed, continuing with original query: {}", e);
                return None;
            }
        };

        match serde_json::from_value::<DisambiguationResult>(value) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Disambiguation response did not match schema: {}", e);
                None
            }
        }
    }

    fn build_context(&self, history: &[ConversationTurn], profile: Option<&UserProfile>) -> String {
        let history_block = format_history(
            history,
            self.config.max_history_turns,
            self.config.max_turn_chars,
        );
        let profile_block = user_state_summary(profile);
        let persona = profile
            .map(|p| p.persona_traits.join(", "))
            .unwrap_or_default();

        let mut context = format!("{profile_block}\n{history_block}");
        if !persona.is_empty() {
            context = format!("Persona: {persona}\n{context}");
        }
        cap_block(&context, self.config.max_context_chars)
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "originalQuery": { "type": "string" },
                "resolvedQuery": { "type": "string" },
                "trueIntent": { "type": "string" },
                "entities": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "type": { "type": "string" },
                            "referenceKind": {
                                "type": "string",
                                "enum": ["direct", "pronoun", "demonstrative", "implied"]
                            },
                            "linkedTo": { "type": "string" }
                        },
                        "required": ["name", "type", "referenceKind"]
                    }
                },
                "references": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "expression": { "type": "string" },
                            "resolvedTo": { "type": "string" },
                            "confidence": { "type": "string", "enum": ["high", "medium", "low"] }
                        },
                        "required": ["expression", "resolvedTo", "confidence"]
                    }
                },
                "implicitNeeds": { "type": "array", "items": { "type": "string" } },
                "confidence": { "type": "string", "enum": ["high", "medium", "low"] },
                "languageDetected": { "type": "string" }
            },
            "required": ["originalQuery", "resolvedQuery", "trueIntent"]
        })
    }
}

/// Scan history for turns that mention any of the extracted entities: a
/// literal case-insensitive occurrence of the entity name, or for `date`
/// entities any token from the fixed date vocabulary. Order preserved.
pub fn find_referenced_turns<'a>(
    entities: &[ExtractedEntity],
    history: &'a [ConversationTurn],
) -> Vec<&'a ConversationTurn> {
    history
        .iter()
        .filter(|turn| {
            let text = turn.text().to_lowercase();
            entities.iter().any(|entity| {
                if text.contains(&entity.name.to_lowercase()) {
                    return true;
                }
                entity.entity_type == "date" && DATE_TOKENS.iter().any(|token| text.contains(token))
            })
        })
        .collect()
}
