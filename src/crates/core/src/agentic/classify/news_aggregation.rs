use async_trait::async_trait;
use regex::Regex;

use super::{claim_with_plan, clean_topic, topic_via_memory, Detector, DetectorOutcome};
use crate::agentic::context::TurnContext;
use crate::agentic::planning::PlanKind;

const MEMORY_VOCABULARY: &str = "news headlines interests topics current events briefing";

/// Detects a request for a news roundup ("what's happening in tech",
/// "give me my morning briefing").
pub struct NewsAggregationDetector {
    pattern: Regex,
    secondary: Regex,
}

impl NewsAggregationDetector {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(
                r"(?i)\b(?:news|headlines|briefing|what'?s (?:happening|new|going on)|latest (?:on|about|news)|updates? (?:on|about))\b(?:.{0,12}?\b(?:about|on|in|regarding|around)\s+(?P<topic>[A-Za-z][A-Za-z0-9 +#./-]{1,47}))?",
            )
            .expect("hardcoded regex compiles"),
            secondary: Regex::new(
                r"(?i)(?:interested in|follows?|following|news about|reads? about)\s+(?P<topic>[A-Za-z][A-Za-z0-9+#.-]{1,30})",
            )
            .expect("hardcoded regex compiles"),
        }
    }
}

impl Default for NewsAggregationDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for NewsAggregationDetector {
    fn kind(&self) -> PlanKind {
        PlanKind::NewsAggregation
    }

    async fn try_claim(&self, query: &str, ctx: &TurnContext) -> DetectorOutcome {
        let Some(captures) = self.pattern.captures(query) else {
            return DetectorOutcome::Declined;
        };

        let topic = captures.name("topic").and_then(|m| clean_topic(m.as_str()));
        let topic = match topic {
            Some(topic) => topic,
            None => match topic_via_memory(ctx, MEMORY_VOCABULARY, &self.secondary).await {
                Some(topic) => topic,
                None => return DetectorOutcome::Declined,
            },
        };

        let enriched = format!("{} (topic: {})", query, topic);
        claim_with_plan(self.kind(), &enriched, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whats_happening_with_topic() {
        let detector = NewsAggregationDetector::new();
        let captures = detector
            .pattern
            .captures("what's happening in the rust world")
            .unwrap();
        assert_eq!(captures.name("topic").unwrap().as_str(), "the rust world");
    }

    #[test]
    fn matches_bare_news_request() {
        let detector = NewsAggregationDetector::new();
        let captures = detector.pattern.captures("any news for me?").unwrap();
        assert!(captures.name("topic").is_none());
    }

    #[test]
    fn declines_non_news_queries() {
        let detector = NewsAggregationDetector::new();
        assert!(!detector.pattern.is_match("teach me chess openings"));
    }
}
