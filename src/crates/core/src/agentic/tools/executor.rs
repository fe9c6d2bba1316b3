use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::agentic::planning::{ExecutionPlan, ExecutionStep};
use crate::agentic::tools::registry::ToolRegistry;
use crate::config::OrchestratorConfig;
use aria_agent_tools::{SessionInfo, ToolOutput, ToolUseContext};
use aria_core_types::{ArgumentViolation, ErrorKind, ToolCallResult, ToolStatus};

const DISABLED_MESSAGE: &str = "That capability is currently unavailable.";
const NOT_FOUND_MESSAGE: &str = "I don't know how to do that yet.";
const TIMEOUT_MESSAGE: &str = "That took too long, so I stopped waiting.";
const INTERNAL_MESSAGE: &str = "Something went wrong while running that.";
const INVALID_ARGS_MESSAGE: &str = "Some of the provided details are missing or invalid.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Executes tool calls against the registry: resolves aliases, gates
/// disabled tools, validates arguments, enforces timeouts and normalizes
/// every outcome into a `ToolCallResult`. Never returns an error to its
/// caller.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    config: Arc<OrchestratorConfig>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, config: Arc<OrchestratorConfig>) -> Self {
        Self { registry, config }
    }

    pub async fn execute(
        &self,
        name_or_alias: &str,
        raw_args: Option<Value>,
        ctx: ToolUseContext,
    ) -> ToolCallResult {
        let Some(entry) = self.registry.resolve(name_or_alias) else {
            return ToolCallResult::error(
                ErrorKind::NotFound,
                NOT_FOUND_MESSAGE,
                Some(format!("unknown tool or alias: {}", name_or_alias)),
            );
        };
        let tool = entry.tool.clone();

        // Disabled state is checked before argument validation so a turned
        // off tool leaks neither schema details nor validation work.
        if !tool.enabled() {
            return ToolCallResult::error(ErrorKind::Disabled, DISABLED_MESSAGE, None);
        }

        // Null input counts as "no arguments", not as a type violation.
        let args = match raw_args {
            None | Some(Value::Null) => json!({}),
            Some(args) => args,
        };
        let violations = entry.validate_args(&args);
        if !violations.is_empty() {
            return ToolCallResult::invalid_arguments(INVALID_ARGS_MESSAGE, violations);
        }

        let pre = tool.validate_input(&args, Some(&ctx)).await;
        if !pre.result {
            let message = pre
                .message
                .unwrap_or_else(|| "input rejected by tool".to_string());
            return ToolCallResult::invalid_arguments(
                INVALID_ARGS_MESSAGE,
                vec![ArgumentViolation {
                    path: String::new(),
                    rule: "tool".to_string(),
                    message,
                }],
            );
        }

        let timeout_ms = tool.timeout_ms().unwrap_or(self.config.default_tool_timeout_ms);
        let token = ctx.cancellation_token.clone();
        let tool_name = tool.name().to_string();
        let started = Instant::now();

        // The handler runs in its own task so a panic is contained and a
        // timeout can abandon it. It already holds the cancellation token
        // through the context; a handler that ignores the cancel signal
        // leaks until it finishes on its own.
        let handle = tokio::spawn(async move { tool.execute(&args, &ctx).await });

        match tokio::time::timeout(Duration::from_millis(timeout_ms), handle).await {
            Err(_) => {
                token.cancel();
                let elapsed_ms = started.elapsed().as_millis();
                warn!(
                    "Tool timed out: tool={}, budget_ms={}, elapsed_ms={}",
                    tool_name, timeout_ms, elapsed_ms
                );
                ToolCallResult::error(
                    ErrorKind::Timeout,
                    TIMEOUT_MESSAGE,
                    Some(format!(
                        "tool '{}' exceeded its {}ms budget (elapsed {}ms)",
                        tool_name, timeout_ms, elapsed_ms
                    )),
                )
            }
            Ok(Err(join_error)) => {
                let detail = panic_detail(join_error);
                warn!("Tool handler crashed: tool={}, detail={}", tool_name, detail);
                ToolCallResult::error(ErrorKind::Internal, INTERNAL_MESSAGE, Some(detail))
            }
            Ok(Ok(Err(tool_error))) => {
                warn!("Tool handler failed: tool={}, error={}", tool_name, tool_error);
                ToolCallResult::error(ErrorKind::Internal, INTERNAL_MESSAGE, Some(tool_error.to_string()))
            }
            Ok(Ok(Ok(output))) => normalize(output),
        }
    }

    /// Execute a batch concurrently. One call's failure never affects the
    /// others; the result vector matches input order with exactly one entry
    /// per input.
    pub async fn execute_batch(
        &self,
        calls: Vec<BatchToolCall>,
        session: &SessionInfo,
    ) -> Vec<ToolCallResult> {
        let futures = calls.into_iter().map(|call| {
            let ctx = session.tool_context();
            async move { self.execute(&call.tool_name, call.arguments, ctx).await }
        });
        join_all(futures).await
    }

    /// Walk an execution plan group by group. Within a group, steps run in
    /// dependency waves: everything whose dependencies have succeeded runs
    /// concurrently. `depends_on` edges are honored regardless of the
    /// advisory `parallel` flag; a step whose dependency failed is reported
    /// as an error, not silently dropped.
    pub async fn run_plan(&self, plan: &ExecutionPlan, session: &SessionInfo) -> PlanRunReport {
        let mut done: HashMap<String, bool> = HashMap::new();
        let mut steps = Vec::new();

        for (group_index, group) in plan.groups.iter().enumerate() {
            let mut pending: Vec<&ExecutionStep> = group.steps.iter().collect();

            while !pending.is_empty() {
                let mut wave = Vec::new();
                let mut dep_failed = Vec::new();
                let mut blocked = Vec::new();

                for step in pending {
                    let deps = step.depends_on();
                    if !deps.iter().all(|d| done.contains_key(d)) {
                        blocked.push(step);
                    } else if deps.iter().all(|d| done.get(d).copied().unwrap_or(false)) {
                        wave.push(step);
                    } else {
                        dep_failed.push(step);
                    }
                }

                let progressed = !wave.is_empty() || !dep_failed.is_empty();

                for step in dep_failed {
                    done.insert(step.id().to_string(), false);
                    steps.push(StepRecord {
                        group_index,
                        intent_addressed: group.intent_addressed.clone(),
                        step_id: step.id().to_string(),
                        tool_name: step_tool_name(step),
                        result: ToolCallResult::handler_error("skipped: a dependency failed"),
                    });
                }

                if !progressed {
                    // Validated plans cannot get here; guard against
                    // hand-built ones with dangling dependencies.
                    for step in blocked {
                        done.insert(step.id().to_string(), false);
                        steps.push(StepRecord {
                            group_index,
                            intent_addressed: group.intent_addressed.clone(),
                            step_id: step.id().to_string(),
                            tool_name: step_tool_name(step),
                            result: ToolCallResult::handler_error(
                                "skipped: dependency could not be satisfied",
                            ),
                        });
                    }
                    break;
                }

                let results = join_all(wave.iter().map(|step| self.run_step(step, session))).await;
                for (step, result) in wave.into_iter().zip(results) {
                    done.insert(step.id().to_string(), result.is_success());
                    steps.push(StepRecord {
                        group_index,
                        intent_addressed: group.intent_addressed.clone(),
                        step_id: step.id().to_string(),
                        tool_name: step_tool_name(step),
                        result,
                    });
                }

                pending = group
                    .steps
                    .iter()
                    .filter(|s| !done.contains_key(s.id()))
                    .collect();
            }
        }

        PlanRunReport { steps }
    }

    async fn run_step(&self, step: &ExecutionStep, session: &SessionInfo) -> ToolCallResult {
        match step {
            ExecutionStep::Narrative { description, .. } => {
                ToolCallResult::success(description.clone(), None)
            }
            ExecutionStep::ToolCall { tool_name, args, .. } => {
                self.execute(tool_name, Some(args.clone()), session.tool_context())
                    .await
            }
        }
    }
}

fn step_tool_name(step: &ExecutionStep) -> Option<String> {
    match step {
        ExecutionStep::ToolCall { tool_name, .. } => Some(tool_name.clone()),
        ExecutionStep::Narrative { .. } => None,
    }
}

fn normalize(output: ToolOutput) -> ToolCallResult {
    match output.error {
        // The handler completed but reported its own error.
        Some(error) => ToolCallResult {
            status: ToolStatus::Error,
            message: error,
            structured_data: output.structured_data,
            error_kind: None,
            error: None,
            violations: Vec::new(),
        },
        None => ToolCallResult::success(
            output.result.unwrap_or_else(|| "Done.".to_string()),
            output.structured_data,
        ),
    }
}

fn panic_detail(join_error: tokio::task::JoinError) -> String {
    if !join_error.is_panic() {
        return "handler task was cancelled".to_string();
    }
    match join_error.into_panic().downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|_| "handler panicked".to_string()),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub group_index: usize,
    pub intent_addressed: String,
    pub step_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    pub result: ToolCallResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRunReport {
    pub steps: Vec<StepRecord>,
}

impl PlanRunReport {
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.result.is_success())
    }
}
