//! Execution planning
//!
//! Plans are declarative: the generator produces steps, the executor runs
//! them. Every plan shape projects into the common `ExecutionPlan` so the
//! executor only ever consumes one step model.

mod generator;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agentic::tools::ToolRegistry;
use crate::util::errors::{AriaError, AriaResult};

pub use generator::PlannerSet;

/// Closed set of specialized handling categories a detector can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    LearningContinuity,
    ProgressCheckpoint,
    SkillLearning,
    MultiIntent,
    NewsAggregation,
    FocusMode,
    ProactiveSuggestion,
}

impl PlanKind {
    pub fn label(&self) -> &'static str {
        match self {
            PlanKind::LearningContinuity => "learning_continuity",
            PlanKind::ProgressCheckpoint => "progress_checkpoint",
            PlanKind::SkillLearning => "skill_learning",
            PlanKind::MultiIntent => "multi_intent",
            PlanKind::NewsAggregation => "news_aggregation",
            PlanKind::FocusMode => "focus_mode",
            PlanKind::ProactiveSuggestion => "proactive_suggestion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionStep {
    #[serde(rename_all = "camelCase")]
    ToolCall {
        id: String,
        tool_name: String,
        #[serde(default)]
        args: Value,
        #[serde(default)]
        depends_on: Vec<String>,
        /// Advisory scheduling hint; `depends_on` edges win regardless.
        #[serde(default)]
        parallel: bool,
        #[serde(default)]
        rationale: String,
    },
    #[serde(rename_all = "camelCase")]
    Narrative { id: String, description: String },
}

impl ExecutionStep {
    pub fn id(&self) -> &str {
        match self {
            ExecutionStep::ToolCall { id, .. } => id,
            ExecutionStep::Narrative { id, .. } => id,
        }
    }

    pub fn depends_on(&self) -> &[String] {
        match self {
            ExecutionStep::ToolCall { depends_on, .. } => depends_on,
            ExecutionStep::Narrative { .. } => &[],
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, ExecutionStep::ToolCall { parallel: true, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionGroup {
    pub intent_addressed: String,
    pub steps: Vec<ExecutionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub groups: Vec<ExecutionGroup>,
}

impl ExecutionPlan {
    pub fn step_count(&self) -> usize {
        self.groups.iter().map(|g| g.steps.len()).sum()
    }

    fn steps(&self) -> impl Iterator<Item = &ExecutionStep> {
        self.groups.iter().flat_map(|g| g.steps.iter())
    }

    /// Check the plan's structural invariants against the registry:
    /// unique step ids, known dependency targets pointing at the same or an
    /// earlier group, an acyclic dependency graph, no `parallel` steps
    /// depending on each other within a group, and every tool-call step
    /// naming a registered tool with its required arguments present.
    pub fn validate(&self, registry: &ToolRegistry) -> AriaResult<()> {
        let mut group_of: HashMap<&str, usize> = HashMap::new();
        for (group_index, group) in self.groups.iter().enumerate() {
            for step in &group.steps {
                if group_of.insert(step.id(), group_index).is_some() {
                    return Err(AriaError::Validation(format!(
                        "duplicate step id '{}'",
                        step.id()
                    )));
                }
            }
        }

        for (group_index, group) in self.groups.iter().enumerate() {
            for step in &group.steps {
                for dep in step.depends_on() {
                    match group_of.get(dep.as_str()) {
                        None => {
                            return Err(AriaError::Validation(format!(
                                "step '{}' depends on unknown step id '{}'",
                                step.id(),
                                dep
                            )));
                        }
                        Some(dep_group) if *dep_group > group_index => {
                            return Err(AriaError::Validation(format!(
                                "step '{}' depends on '{}' in a later group",
                                step.id(),
                                dep
                            )));
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        self.check_acyclic()?;
        self.check_parallel_invariant()?;
        self.check_tools(registry)
    }

    fn check_acyclic(&self) -> AriaResult<()> {
        let steps: HashMap<&str, &ExecutionStep> =
            self.steps().map(|s| (s.id(), s)).collect();

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }
        let mut marks: HashMap<&str, Mark> = HashMap::new();

        fn visit<'a>(
            id: &'a str,
            steps: &HashMap<&'a str, &'a ExecutionStep>,
            marks: &mut HashMap<&'a str, Mark>,
        ) -> AriaResult<()> {
            match marks.get(id) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(AriaError::Validation(format!(
                        "dependency cycle involving step '{}'",
                        id
                    )));
                }
                None => {}
            }
            marks.insert(id, Mark::Visiting);
            if let Some(step) = steps.get(id) {
                for dep in step.depends_on() {
                    visit(dep, steps, marks)?;
                }
            }
            marks.insert(id, Mark::Done);
            Ok(())
        }

        for id in steps.keys() {
            visit(id, &steps, &mut marks)?;
        }
        Ok(())
    }

    fn check_parallel_invariant(&self) -> AriaResult<()> {
        for group in &self.groups {
            let parallel_ids: HashSet<&str> = group
                .steps
                .iter()
                .filter(|s| s.is_parallel())
                .map(|s| s.id())
                .collect();
            for step in group.steps.iter().filter(|s| s.is_parallel()) {
                for dep in step.depends_on() {
                    if parallel_ids.contains(dep.as_str()) {
                        return Err(AriaError::Validation(format!(
                            "parallel step '{}' depends on parallel step '{}' in the same group",
                            step.id(),
                            dep
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_tools(&self, registry: &ToolRegistry) -> AriaResult<()> {
        for step in self.steps() {
            let ExecutionStep::ToolCall { id, tool_name, args, .. } = step else {
                continue;
            };
            let Some(entry) = registry.resolve(tool_name) else {
                return Err(AriaError::Validation(format!(
                    "step '{}' names unknown tool '{}'",
                    id, tool_name
                )));
            };
            for required in entry.required_args() {
                if args.get(&required).is_none() {
                    return Err(AriaError::Validation(format!(
                        "step '{}' omits required argument '{}' of tool '{}'",
                        id, required, tool_name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPhase {
    pub phase: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub steps: Vec<ExecutionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLearningPlan {
    pub topic: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub learning_phases: Vec<LearningPhase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOrchestration {
    #[serde(default)]
    pub parallel_group: Vec<ExecutionStep>,
    #[serde(default)]
    pub followup: Vec<ExecutionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusModePlan {
    pub activity: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub tool_orchestration: ToolOrchestration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsAggregationPlan {
    pub topics: Vec<String>,
    #[serde(default)]
    pub summary_style: Option<String>,
    pub steps: Vec<ExecutionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentGroup {
    pub intent: String,
    pub steps: Vec<ExecutionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOfThoughtPlan {
    pub groups: Vec<IntentGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveSuggestionPlan {
    pub suggestion: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub steps: Vec<ExecutionStep>,
}

/// The unified plan shape. Each variant keeps its domain fields; the
/// executor only ever sees the `to_execution_steps` projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plan {
    SkillLearning(SkillLearningPlan),
    FocusMode(FocusModePlan),
    NewsAggregation(NewsAggregationPlan),
    ChainOfThought(ChainOfThoughtPlan),
    ProactiveSuggestion(ProactiveSuggestionPlan),
}

impl Plan {
    pub fn to_execution_steps(&self) -> ExecutionPlan {
        let groups = match self {
            Plan::SkillLearning(plan) => plan
                .learning_phases
                .iter()
                .map(|phase| ExecutionGroup {
                    intent_addressed: if phase.objective.is_empty() {
                        format!("{}: {}", plan.topic, phase.phase)
                    } else {
                        format!("{}: {}", phase.phase, phase.objective)
                    },
                    steps: phase.steps.clone(),
                })
                .collect(),
            Plan::FocusMode(plan) => {
                let mut groups = vec![ExecutionGroup {
                    intent_addressed: format!("Focus session: {}", plan.activity),
                    steps: plan.tool_orchestration.parallel_group.clone(),
                }];
                if !plan.tool_orchestration.followup.is_empty() {
                    groups.push(ExecutionGroup {
                        intent_addressed: format!("Focus follow-up: {}", plan.activity),
                        steps: plan.tool_orchestration.followup.clone(),
                    });
                }
                groups
            }
            Plan::NewsAggregation(plan) => vec![ExecutionGroup {
                intent_addressed: format!("News briefing: {}", plan.topics.join(", ")),
                steps: plan.steps.clone(),
            }],
            Plan::ChainOfThought(plan) => plan
                .groups
                .iter()
                .map(|group| ExecutionGroup {
                    intent_addressed: group.intent.clone(),
                    steps: group.steps.clone(),
                })
                .collect(),
            Plan::ProactiveSuggestion(plan) => vec![ExecutionGroup {
                intent_addressed: plan.suggestion.clone(),
                steps: plan.steps.clone(),
            }],
        };
        ExecutionPlan { groups }
    }
}
