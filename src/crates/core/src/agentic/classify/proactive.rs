use async_trait::async_trait;
use log::debug;
use rand::Rng;

use super::{claim_with_plan, Detector, DetectorOutcome};
use crate::agentic::context::TurnContext;
use crate::agentic::planning::PlanKind;
use crate::infrastructure::memory::SearchOptions;

const MEMORY_VOCABULARY: &str = "important facts preferences goals reminders interests projects tasks";

/// Fires probabilistically on turns no other detector claimed, and only
/// when memory holds enough context to suggest something useful. Not
/// triggered by query content at all.
pub struct ProactiveSuggestionDetector;

impl ProactiveSuggestionDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProactiveSuggestionDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for ProactiveSuggestionDetector {
    fn kind(&self) -> PlanKind {
        PlanKind::ProactiveSuggestion
    }

    async fn try_claim(&self, query: &str, ctx: &TurnContext) -> DetectorOutcome {
        let roll: f64 = rand::thread_rng().gen();
        if roll >= ctx.config.proactive_probability {
            return DetectorOutcome::Declined;
        }

        let known = match ctx
            .memory
            .search(MEMORY_VOCABULARY, &ctx.user_id, SearchOptions::default())
            .await
        {
            Ok(response) => response.results,
            Err(e) => {
                debug!("Proactive context check failed: {}", e);
                return DetectorOutcome::Declined;
            }
        };
        if known.is_empty() {
            debug!("Proactive suggestion skipped: no stored context for user");
            return DetectorOutcome::Declined;
        }

        let facts = known
            .iter()
            .map(|hit| format!("- {}", hit.content))
            .collect::<Vec<_>>()
            .join("\n");
        let enriched = format!("{}\n\nKnown about the user:\n{}", query, facts);
        claim_with_plan(self.kind(), &enriched, ctx).await
    }
}
