//! Query classifier chain
//!
//! An ordered sequence of detectors that each attempt to claim the query;
//! the first claim wins and later detectors never run. The narrow regex
//! detectors are a deliberate cost-control heuristic: they pre-empt the more
//! expensive multi-intent LLM classification with cheap rejections.

mod focus_mode;
mod learning_continuity;
mod multi_intent;
mod news_aggregation;
mod proactive;
mod progress_checkpoint;
mod skill_learning;

use async_trait::async_trait;
use log::{debug, info, warn};
use regex::Regex;

use crate::agentic::context::TurnContext;
use crate::agentic::planning::{Plan, PlanKind};
use crate::infrastructure::memory::SearchOptions;

pub use focus_mode::FocusModeDetector;
pub use learning_continuity::LearningContinuityDetector;
pub use multi_intent::MultiIntentDetector;
pub use news_aggregation::NewsAggregationDetector;
pub use proactive::ProactiveSuggestionDetector;
pub use progress_checkpoint::ProgressCheckpointDetector;
pub use skill_learning::SkillLearningDetector;

#[derive(Debug)]
pub enum DetectorOutcome {
    /// The query is not this detector's business.
    Declined,
    Claimed(Plan),
    /// Claimed, but plan generation failed. The chain falls through.
    Failed { reason: String },
}

#[async_trait]
pub trait Detector: Send + Sync {
    fn kind(&self) -> PlanKind;

    async fn try_claim(&self, query: &str, ctx: &TurnContext) -> DetectorOutcome;
}

pub struct ClassifierChain {
    detectors: Vec<Box<dyn Detector>>,
}

impl ClassifierChain {
    /// The fixed priority order. Continuity/checkpoint detectors are cheap
    /// narrow matches and run before the general multi-intent
    /// classification; the proactive detector only ever sees unclaimed
    /// turns.
    pub fn standard() -> Self {
        Self::with_detectors(vec![
            Box::new(LearningContinuityDetector::new()),
            Box::new(ProgressCheckpointDetector::new()),
            Box::new(SkillLearningDetector::new()),
            Box::new(MultiIntentDetector::new()),
            Box::new(NewsAggregationDetector::new()),
            Box::new(FocusModeDetector::new()),
            Box::new(ProactiveSuggestionDetector::new()),
        ])
    }

    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Run the chain strictly sequentially, stopping at the first claim.
    /// A claim whose plan generation failed has no user-visible effect, so
    /// it always falls through to the next detector.
    pub async fn classify(&self, query: &str, ctx: &TurnContext) -> Option<(PlanKind, Plan)> {
        for detector in &self.detectors {
            match detector.try_claim(query, ctx).await {
                DetectorOutcome::Declined => continue,
                DetectorOutcome::Claimed(plan) => {
                    info!("Query claimed: kind={}", detector.kind().label());
                    return Some((detector.kind(), plan));
                }
                DetectorOutcome::Failed { reason } => {
                    warn!(
                        "Detector claimed but produced no plan, falling through: kind={}, reason={}",
                        detector.kind().label(),
                        reason
                    );
                    continue;
                }
            }
        }
        None
    }
}

/// Shared fallback for regex detectors whose required capture came up
/// empty: run a keyword memory search over the detector's vocabulary and
/// pull a topic out of the top hits with the secondary pattern.
pub(crate) async fn topic_via_memory(
    ctx: &TurnContext,
    vocabulary: &str,
    secondary: &Regex,
) -> Option<String> {
    let response = match ctx
        .memory
        .search(vocabulary, &ctx.user_id, SearchOptions::default())
        .await
    {
        Ok(response) => response,
        Err(e) => {
            debug!("Topic fallback memory search failed: {}", e);
            return None;
        }
    };

    for hit in &response.results {
        if let Some(captures) = secondary.captures(&hit.content) {
            if let Some(topic) = captures.name("topic") {
                let topic = topic.as_str().trim();
                if !topic.is_empty() {
                    return Some(topic.to_string());
                }
            }
        }
    }
    None
}

/// Trim captured topic text: punctuation and trailing filler words that the
/// loose capture patterns tend to swallow.
pub(crate) fn clean_topic(raw: &str) -> Option<String> {
    const FILLERS: &[&str] = &["please", "now", "today", "tonight", "again", "thanks"];
    let mut tokens: Vec<&str> = raw
        .trim()
        .trim_end_matches(['.', ',', '!', '?'])
        .split_whitespace()
        .collect();
    while let Some(last) = tokens.last() {
        if FILLERS.contains(&last.to_lowercase().as_str()) {
            tokens.pop();
        } else {
            break;
        }
    }
    if tokens.is_empty() {
        return None;
    }
    Some(tokens.join(" "))
}

/// Generate the claimed plan, mapping generation failure to a fallthrough.
pub(crate) async fn claim_with_plan(kind: PlanKind, query: &str, ctx: &TurnContext) -> DetectorOutcome {
    match ctx.planner.generate(kind, query, ctx).await {
        Ok(plan) => DetectorOutcome::Claimed(plan),
        Err(e) => DetectorOutcome::Failed {
            reason: e.to_string(),
        },
    }
}
