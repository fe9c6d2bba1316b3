use async_trait::async_trait;
use regex::Regex;

use super::{claim_with_plan, clean_topic, topic_via_memory, Detector, DetectorOutcome};
use crate::agentic::context::TurnContext;
use crate::agentic::planning::PlanKind;

const MEMORY_VOCABULARY: &str = "focus concentration work project task deadline";

/// Detects a request to set up a focus session ("help me focus on writing
/// for 25 minutes", "start a pomodoro").
pub struct FocusModeDetector {
    pattern: Regex,
    duration: Regex,
    secondary: Regex,
}

impl FocusModeDetector {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(
                r"(?i)\b(?:focus (?:mode|session|time)|help me (?:focus|concentrate)|deep work|pomodoro|study session|need to focus)\b(?:.{0,8}?\bon\s+(?P<activity>[A-Za-z][A-Za-z0-9 +#./-]{1,47}))?",
            )
            .expect("hardcoded regex compiles"),
            duration: Regex::new(r"(?i)\b(?P<minutes>\d{1,3})\s*(?:min(?:ute)?s?|m\b)|\b(?P<hours>\d{1,2})\s*h(?:ou)?rs?\b")
                .expect("hardcoded regex compiles"),
            secondary: Regex::new(
                r"(?i)(?:working on|focused on|project|task|deadline for)\s*:?\s*(?P<topic>[A-Za-z][A-Za-z0-9+#.-]{1,30})",
            )
            .expect("hardcoded regex compiles"),
        }
    }

    fn duration_minutes(&self, query: &str) -> Option<u32> {
        let captures = self.duration.captures(query)?;
        if let Some(minutes) = captures.name("minutes") {
            return minutes.as_str().parse().ok();
        }
        captures
            .name("hours")
            .and_then(|h| h.as_str().parse::<u32>().ok())
            .map(|h| h * 60)
    }
}

impl Default for FocusModeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for FocusModeDetector {
    fn kind(&self) -> PlanKind {
        PlanKind::FocusMode
    }

    async fn try_claim(&self, query: &str, ctx: &TurnContext) -> DetectorOutcome {
        let Some(captures) = self.pattern.captures(query) else {
            return DetectorOutcome::Declined;
        };

        let activity = captures
            .name("activity")
            .and_then(|m| clean_topic(strip_duration_suffix(m.as_str())));
        let activity = match activity {
            Some(activity) => activity,
            None => match topic_via_memory(ctx, MEMORY_VOCABULARY, &self.secondary).await {
                Some(activity) => activity,
                None => return DetectorOutcome::Declined,
            },
        };

        let enriched = match self.duration_minutes(query) {
            Some(minutes) => format!("{} (activity: {}, minutes: {})", query, activity, minutes),
            None => format!("{} (activity: {})", query, activity),
        };
        claim_with_plan(self.kind(), &enriched, ctx).await
    }
}

/// The loose activity capture tends to swallow "for 25 minutes"; cut it off.
fn strip_duration_suffix(activity: &str) -> &str {
    match activity.to_lowercase().find(" for ") {
        Some(index) => &activity[..index],
        None => activity,
    }
}
