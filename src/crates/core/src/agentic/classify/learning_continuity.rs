use async_trait::async_trait;
use regex::Regex;

use super::{claim_with_plan, clean_topic, topic_via_memory, Detector, DetectorOutcome};
use crate::agentic::context::TurnContext;
use crate::agentic::planning::PlanKind;

const MEMORY_VOCABULARY: &str = "learning lessons course studying progress resume continue";

/// Detects a request to resume an in-progress learning effort
/// ("continue my spanish lessons", "where did we leave off").
pub struct LearningContinuityDetector {
    pattern: Regex,
    secondary: Regex,
}

impl LearningContinuityDetector {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(
                r"(?i)\b(?:continue|resume|pick up|get back to|back to)\b.{0,20}?\b(?:learning|lessons?|studies|studying|course|practice|practicing)\b(?:\s+(?:(?:of|on|in|about|with)\s+)?(?P<topic>[A-Za-z][A-Za-z0-9 +#./-]{1,47}))?|\bwhere did (?:i|we) (?:leave|stop)\b",
            )
            .expect("hardcoded regex compiles"),
            secondary: Regex::new(
                r"(?i)(?:learning|studying|course on|lessons? (?:in|on)|practicing)\s+(?P<topic>[A-Za-z][A-Za-z0-9+#.-]{1,30})",
            )
            .expect("hardcoded regex compiles"),
        }
    }
}

impl Default for LearningContinuityDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for LearningContinuityDetector {
    fn kind(&self) -> PlanKind {
        PlanKind::LearningContinuity
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
    fn matches_resume_phrasing_with_topic() {
        let detector = LearningContinuityDetector::new();
        let captures = detector.pattern.captures("can I continue learning spanish").unwrap();
        assert_eq!(captures.name("topic").unwrap().as_str(), "spanish");
    }

    #[test]
    fn matches_leave_off_phrasing_without_topic() {
        let detector = LearningContinuityDetector::new();
        assert!(detector.pattern.is_match("where did we leave off yesterday?"));
    }

    #[test]
    fn declines_ordinary_queries() {
        let detector = LearningContinuityDetector::new();
        assert!(!detector.pattern.is_match("what's the weather in Paris"));
        assert!(!detector.pattern.is_match("cancel the 3pm reminder"));
    }

    #[test]
    fn secondary_extracts_topic_from_memory_content() {
        let detector = LearningContinuityDetector::new();
        let captures = detector
            .secondary
            .captures("user has been studying italian since march")
            .unwrap();
        assert_eq!(captures.name("topic").unwrap().as_str(), "italian");
    }
}
