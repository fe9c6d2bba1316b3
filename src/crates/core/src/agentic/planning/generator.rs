use log::warn;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    ChainOfThoughtPlan, ExecutionStep, FocusModePlan, IntentGroup, LearningPhase,
    NewsAggregationPlan, Plan, PlanKind, ProactiveSuggestionPlan, SkillLearningPlan,
    ToolOrchestration,
};
use crate::agentic::context::TurnContext;
use crate::infrastructure::completion::CompletionRequest;
use crate::util::errors::{AriaError, AriaResult};

/// One generation routine per plan kind. Statically injected so the set of
/// supported plan shapes is closed and enumerable.
pub struct PlannerSet;

impl PlannerSet {
    pub fn new() -> Self {
        Self
    }

    pub async fn generate(&self, kind: PlanKind, query: &str, ctx: &TurnContext) -> AriaResult<Plan> {
        let plan = match kind {
            PlanKind::SkillLearning | PlanKind::LearningContinuity => {
                self.skill_learning(kind, query, ctx).await?
            }
            PlanKind::ProgressCheckpoint | PlanKind::MultiIntent => {
                self.chain_of_thought(kind, query, ctx).await?
            }
            PlanKind::NewsAggregation => self.news_aggregation(kind, query, ctx).await?,
            PlanKind::FocusMode => self.focus_mode(kind, query, ctx).await?,
            PlanKind::ProactiveSuggestion => self.proactive(kind, query, ctx).await?,
        };

        let execution = plan.to_execution_steps();
        if execution.step_count() == 0 && !matches!(plan, Plan::ProactiveSuggestion(_)) {
            return Err(AriaError::Validation("planner returned an empty plan".to_string()));
        }
        execution.validate(&ctx.registry)?;
        Ok(plan)
    }

    async fn skill_learning(&self, kind: PlanKind, query: &str, ctx: &TurnContext) -> AriaResult<Plan> {
        let instructions = match kind {
            PlanKind::LearningContinuity => {
                "The user wants to resume an in-progress learning effort. Produce a short \
                 sequence of learning phases that picks up where they left off: recap first, \
                 then the next new material, then practice."
            }
            _ => {
                "The user wants to learn a skill from scratch. Produce 2-4 learning phases \
                 (foundations, practice, deepening), each with concrete steps."
            }
        };
        let schema = json!({
            "type": "object",
            "properties": {
                "topic": { "type": "string" },
                "duration": { "type": "string" },
                "learningPhases": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "phase": { "type": "string" },
                            "objective": { "type": "string" },
                            "steps": { "type": "array", "items": step_schema() }
                        },
                        "required": ["phase"]
                    }
                }
            },
            "required": ["topic", "learningPhases"]
        });

        let value = self.complete(kind, query, ctx, instructions, schema).await?;
        let raw: RawSkillPlan = parse_draft(kind, value)?;

        let groups = materialize_groups(raw.learning_phases.iter().map(|p| p.steps.clone()).collect());
        let learning_phases = raw
            .learning_phases
            .into_iter()
            .zip(groups)
            .map(|(phase, steps)| LearningPhase {
                phase: phase.phase,
                objective: phase.objective,
                steps,
            })
            .collect();

        Ok(Plan::SkillLearning(SkillLearningPlan {
            topic: raw.topic,
            duration: raw.duration,
            learning_phases,
        }))
    }

    async fn chain_of_thought(&self, kind: PlanKind, query: &str, ctx: &TurnContext) -> AriaResult<Plan> {
        let instructions = match kind {
            PlanKind::ProgressCheckpoint => {
                "The user is asking for a progress check. Produce one group per aspect to \
                 review (what was done, what is next), with steps that gather the evidence."
            }
            _ => {
                "The request bundles several distinct intents. Produce one group per intent, \
                 in the order they should be addressed, each with the steps that satisfy it."
            }
        };
        let schema = json!({
            "type": "object",
            "properties": {
                "groups": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "intent": { "type": "string" },
                            "steps": { "type": "array", "items": step_schema() }
                        },
                        "required": ["intent"]
                    }
                }
            },
            "required": ["groups"]
        });

        let value = self.complete(kind, query, ctx, instructions, schema).await?;
        let raw: RawCotPlan = parse_draft(kind, value)?;

        let groups = materialize_groups(raw.groups.iter().map(|g| g.steps.clone()).collect());
        let groups = raw
            .groups
            .into_iter()
            .zip(groups)
            .map(|(group, steps)| IntentGroup {
                intent: group.intent,
                steps,
            })
            .collect();

        Ok(Plan::ChainOfThought(ChainOfThoughtPlan { groups }))
    }

    async fn news_aggregation(&self, kind: PlanKind, query: &str, ctx: &TurnContext) -> AriaResult<Plan> {
        let instructions = "The user wants a news briefing. List the topics to cover and \
                            produce the search/lookup steps; independent lookups should be \
                            marked parallel.";
        let schema = json!({
            "type": "object",
            "properties": {
                "topics": { "type": "array", "items": { "type": "string" } },
                "summaryStyle": { "type": "string" },
                "steps": { "type": "array", "items": step_schema() }
            },
            "required": ["topics", "steps"]
        });

        let value = self.complete(kind, query, ctx, instructions, schema).await?;
        let raw: RawNewsPlan = parse_draft(kind, value)?;

        let mut groups = materialize_groups(vec![raw.steps]);
        Ok(Plan::NewsAggregation(NewsAggregationPlan {
            topics: raw.topics,
            summary_style: raw.summary_style,
            steps: groups.pop().unwrap_or_default(),
        }))
    }

    async fn focus_mode(&self, kind: PlanKind, query: &str, ctx: &TurnContext) -> AriaResult<Plan> {
        let instructions = "The user wants a focus session. Produce the preparation steps \
                            that can run side by side (parallelSteps) and anything that must \
                            happen after they finish (followupSteps).";
        let schema = json!({
            "type": "object",
            "properties": {
                "activity": { "type": "string" },
                "durationMinutes": { "type": "integer" },
                "parallelSteps": { "type": "array", "items": step_schema() },
                "followupSteps": { "type": "array", "items": step_schema() }
            },
            "required": ["activity", "parallelSteps"]
        });

        let value = self.complete(kind, query, ctx, instructions, schema).await?;
        let mut raw: RawFocusPlan = parse_draft(kind, value)?;
        for step in &mut raw.parallel_steps {
            step.parallel = true;
        }

        let mut groups = materialize_groups(vec![raw.parallel_steps, raw.followup_steps]);
        let followup = groups.pop().unwrap_or_default();
        let parallel_group = groups.pop().unwrap_or_default();

        Ok(Plan::FocusMode(FocusModePlan {
            activity: raw.activity,
            duration_minutes: raw.duration_minutes,
            tool_orchestration: ToolOrchestration {
                parallel_group,
                followup,
            },
        }))
    }

    async fn proactive(&self, kind: PlanKind, query: &str, ctx: &TurnContext) -> AriaResult<Plan> {
        let instructions = "Based on what is known about the user, propose one helpful, \
                            unprompted suggestion. Add tool steps only when they directly \
                            support the suggestion.";
        let schema = json!({
            "type": "object",
            "properties": {
                "suggestion": { "type": "string" },
                "rationale": { "type": "string" },
                "steps": { "type": "array", "items": step_schema() }
            },
            "required": ["suggestion"]
        });

        let value = self.complete(kind, query, ctx, instructions, schema).await?;
        let raw: RawProactivePlan = parse_draft(kind, value)?;
        if raw.suggestion.trim().is_empty() {
            return Err(AriaError::Validation("planner returned an empty suggestion".to_string()));
        }

        let mut groups = materialize_groups(vec![raw.steps]);
        Ok(Plan::ProactiveSuggestion(ProactiveSuggestionPlan {
            suggestion: raw.suggestion,
            rationale: raw.rationale,
            steps: groups.pop().unwrap_or_default(),
        }))
    }

    async fn complete(
        &self,
        kind: PlanKind,
        query: &str,
        ctx: &TurnContext,
        instructions: &str,
        schema: Value,
    ) -> AriaResult<Value> {
        let system_prompt = format!(
            r#"You are the planner of a conversational assistant. Build an execution plan for the user's request.

Available tools (use only these, with their required arguments):
{catalog}

User state: {state}

Recent conversation:
{history}

{instructions}

Rules:
- Each step is either a tool call (set toolName and args) or a note (set note).
- dependsOn entries are 0-based indices into the flat list of all steps, in order.
- Mark steps parallel only when they have no dependency on each other.
- Keep plans small and concrete."#,
            catalog = ctx.catalog_text,
            state = ctx.user_state,
            history = ctx.history_summary,
            instructions = instructions,
        );

        ctx.completion
            .complete(
                CompletionRequest::new(system_prompt, query, schema)
                    .with_caller(format!("planner:{}", kind.label()))
                    .with_model(ctx.config.completion_model.clone()),
            )
            .await
    }
}

impl Default for PlannerSet {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_draft<T: serde::de::DeserializeOwned>(kind: PlanKind, value: Value) -> AriaResult<T> {
    serde_json::from_value(value).map_err(|e| {
        AriaError::upstream(format!(
            "planner response did not match the {} draft shape: {}",
            kind.label(),
            e
        ))
    })
}

fn step_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "toolName": { "type": "string" },
            "args": { "type": "object" },
            "dependsOn": { "type": "array", "items": { "type": "integer" } },
            "parallel": { "type": "boolean" },
            "rationale": { "type": "string" },
            "note": { "type": "string" }
        }
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    args: Option<Value>,
    #[serde(default)]
    depends_on: Vec<usize>,
    #[serde(default)]
    parallel: bool,
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

impl RawStep {
    fn into_step(self, id: String, ids: &[String]) -> ExecutionStep {
        match self.tool_name {
            Some(tool_name) if !tool_name.trim().is_empty() => ExecutionStep::ToolCall {
                id,
                tool_name,
                args: self.args.unwrap_or_else(|| json!({})),
                depends_on: self
                    .depends_on
                    .into_iter()
                    .filter_map(|index| {
                        let dep = ids.get(index).cloned();
                        if dep.is_none() {
                            warn!("planner referenced out-of-range step index {}", index);
                        }
                        dep
                    })
                    .collect(),
                parallel: self.parallel,
                rationale: self.rationale.unwrap_or_default(),
            },
            _ => ExecutionStep::Narrative {
                id,
                description: self.note.unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSkillPlan {
    topic: String,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    learning_phases: Vec<RawPhase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPhase {
    phase: String,
    #[serde(default)]
    objective: String,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCotPlan {
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroup {
    intent: String,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNewsPlan {
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    summary_style: Option<String>,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFocusPlan {
    activity: String,
    #[serde(default)]
    duration_minutes: Option<u32>,
    #[serde(default)]
    parallel_steps: Vec<RawStep>,
    #[serde(default)]
    followup_steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProactivePlan {
    suggestion: String,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    steps: Vec<RawStep>,
}

/// Assign flat sequential ids across all draft groups and resolve the
/// planner's index-style dependency references to those ids.
fn materialize_groups(raw_groups: Vec<Vec<RawStep>>) -> Vec<Vec<ExecutionStep>> {
    let total: usize = raw_groups.iter().map(|g| g.len()).sum();
    let ids: Vec<String> = (1..=total).map(|i| format!("step-{}", i)).collect();

    let mut index = 0;
    raw_groups
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .map(|raw| {
                    let step = raw.into_step(ids[index].clone(), &ids);
                    index += 1;
                    step
                })
                .collect()
        })
        .collect()
}
