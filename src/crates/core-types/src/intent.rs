use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Direct,
    Pronoun,
    Demonstrative,
    Implied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub reference_kind: ReferenceKind,
    #[serde(default)]
    pub linked_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedReference {
    pub expression: String,
    pub resolved_to: String,
    pub confidence: Confidence,
}

/// Output of the intent disambiguator. Created once per turn; immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisambiguationResult {
    pub original_query: String,
    pub resolved_query: String,
    #[serde(default)]
    pub entities: Vec<ExtractedEntity>,
    #[serde(default)]
    pub references: Vec<ResolvedReference>,
    #[serde(default)]
    pub implicit_needs: Vec<String>,
    pub true_intent: String,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub language_detected: Option<String>,
}

impl DisambiguationResult {
    /// The canonical query for downstream stages: resolved query, falling
    /// back to the true intent, falling back to the original.
    pub fn canonical_query(&self) -> &str {
        if !self.resolved_query.trim().is_empty() {
            &self.resolved_query
        } else if !self.true_intent.trim().is_empty() {
            &self.true_intent
        } else {
            &self.original_query
        }
    }
}

/// Multi-intent classification derived from a disambiguated query plus
/// history. At most one per turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: String,
    #[serde(default)]
    pub is_multi_intent: bool,
    #[serde(default = "default_intent_count")]
    pub intent_count: usize,
    pub primary_intent: String,
    #[serde(default)]
    pub secondary_intents: Vec<String>,
}

fn default_intent_count() -> usize {
    1
}

impl Classification {
    pub fn multi_intent(&self) -> bool {
        self.is_multi_intent || self.category == "multi_intent_complex" || self.intent_count > 1
    }
}
