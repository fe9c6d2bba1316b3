use async_trait::async_trait;
use regex::Regex;

use super::{claim_with_plan, clean_topic, topic_via_memory, Detector, DetectorOutcome};
use crate::agentic::context::TurnContext;
use crate::agentic::planning::PlanKind;

const MEMORY_VOCABULARY: &str = "learn teaching tutorial lesson course studying";

/// Detects a request to learn a new skill ("teach me spanish",
/// "I want to learn woodworking in 3 weeks").
pub struct SkillLearningDetector {
    pattern: Regex,
    duration: Regex,
    secondary: Regex,
}

impl SkillLearningDetector {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(
                r"(?i)\b(?:teach me|i want to learn|help me learn|learn|tutorial (?:on|for|about)|course (?:on|about)|how to)\b(?:\s+(?:about|to)\b)?(?:\s+(?P<topic>[A-Za-z][A-Za-z0-9 +#./-]{1,47}))?",
            )
            .expect("hardcoded regex compiles"),
            duration: Regex::new(
                r"(?i)\b(?:in|over|within)\s+(?P<duration>\d+\s*(?:days?|weeks?|months?))\b",
            )
            .expect("hardcoded regex compiles"),
            secondary: Regex::new(
                r"(?i)(?:learn(?:ing)?|studying|course on|tutorial (?:on|for)|lessons? (?:in|on))\s+(?P<topic>[A-Za-z][A-Za-z0-9+#.-]{1,30})",
            )
            .expect("hardcoded regex compiles"),
        }
    }
}

impl Default for SkillLearningDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for SkillLearningDetector {
    fn kind(&self) -> PlanKind {
        PlanKind::SkillLearning
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

        let enriched = match self
            .duration
            .captures(query)
            .and_then(|c| c.name("duration"))
        {
            Some(duration) => format!("{} (topic: {}, duration: {})", query, topic, duration.as_str()),
            None => format!("{} (topic: {})", query, topic),
        };
        claim_with_plan(self.kind(), &enriched, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_teach_me_with_topic() {
        let detector = SkillLearningDetector::new();
        let captures = detector.pattern.captures("teach me spanish please").unwrap();
        assert_eq!(
            clean_topic(captures.name("topic").unwrap().as_str()).unwrap(),
            "spanish"
        );
    }

    #[test]
    fn extracts_duration() {
        let detector = SkillLearningDetector::new();
        let captures = detector
            .duration
            .captures("I want to learn woodworking in 3 weeks")
            .unwrap();
        assert_eq!(captures.name("duration").unwrap().as_str(), "3 weeks");
    }

    #[test]
    fn declines_non_learning_queries() {
        let detector = SkillLearningDetector::new();
        assert!(!detector.pattern.is_match("what's the weather like"));
        assert!(!detector.pattern.is_match("cancel the 3pm reminder"));
    }
}
