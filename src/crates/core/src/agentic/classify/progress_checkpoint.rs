use async_trait::async_trait;
use regex::Regex;

use super::{claim_with_plan, clean_topic, topic_via_memory, Detector, DetectorOutcome};
use crate::agentic::context::TurnContext;
use crate::agentic::planning::PlanKind;

const MEMORY_VOCABULARY: &str = "progress milestone achievement goal tracking checkpoint";

/// Detects a request for a progress check ("how am I doing with rust",
/// "progress report").
pub struct ProgressCheckpointDetector {
    pattern: Regex,
    secondary: Regex,
}

impl ProgressCheckpointDetector {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(
                r"(?i)\b(?:how (?:am i|is my) (?:doing|progress(?:ing)?)|progress (?:check|report|update|so far)|check(?: in)? on my progress|how far (?:have i|am i)|where do i stand)\b(?:.{0,12}?\b(?:with|on|in|toward|towards)\s+(?P<topic>[A-Za-z][A-Za-z0-9 +#./-]{1,47}))?",
            )
            .expect("hardcoded regex compiles"),
            secondary: Regex::new(
                r"(?i)(?:progress (?:on|in|with)|working (?:on|toward|towards)|goal (?:of|to)|milestone:?)\s+(?P<topic>[A-Za-z][A-Za-z0-9+#.-]{1,30})",
            )
            .expect("hardcoded regex compiles"),
        }
    }
}

impl Default for ProgressCheckpointDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for ProgressCheckpointDetector {
    fn kind(&self) -> PlanKind {
        PlanKind::ProgressCheckpoint
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
    fn matches_progress_question_with_topic() {
        let detector = ProgressCheckpointDetector::new();
        let captures = detector
            .pattern
            .captures("how am I doing with my rust learning")
            .unwrap();
        assert_eq!(captures.name("topic").unwrap().as_str(), "my rust learning");
    }

    #[test]
    fn matches_bare_progress_report() {
        let detector = ProgressCheckpointDetector::new();
        let captures = detector.pattern.captures("give me a progress report").unwrap();
        assert!(captures.name("topic").is_none());
    }

    #[test]
    fn declines_unrelated_queries() {
        let detector = ProgressCheckpointDetector::new();
        assert!(!detector.pattern.is_match("set a reminder for 3pm"));
    }
}
