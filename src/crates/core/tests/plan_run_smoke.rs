mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use aria_agent_tools::SessionInfo;
use aria_core::agentic::planning::ExecutionGroup;
use aria_core::{ExecutionPlan, ExecutionStep, OrchestratorConfig, ToolExecutor, ToolRegistry};
use serde_json::json;

use support::{NapTool, PanicTool, WeatherTool};

fn executor() -> ToolExecutor {
    let registry = ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .register(Arc::new(NapTool))
        .unwrap()
        .register(Arc::new(PanicTool))
        .unwrap()
        .build();
    ToolExecutor::new(Arc::new(registry), Arc::new(OrchestratorConfig::default()))
}

fn tool_step(id: &str, tool: &str, args: serde_json::Value, deps: &[&str], parallel: bool) -> ExecutionStep {
    ExecutionStep::ToolCall {
        id: id.to_string(),
        tool_name: tool.to_string(),
        args,
        depends_on: deps.iter().map(|d| d.to_string()).collect(),
        parallel,
        rationale: String::new(),
    }
}

fn narrative(id: &str, description: &str) -> ExecutionStep {
    ExecutionStep::Narrative {
        id: id.to_string(),
        description: description.to_string(),
    }
}

#[tokio::test]
async fn independent_steps_run_concurrently_within_a_group() {
    let executor = executor();
    let session = SessionInfo::new("u-plan", "s-plan");

    let plan = ExecutionPlan {
        groups: vec![ExecutionGroup {
            intent_addressed: "naps".to_string(),
            steps: vec![
                tool_step("a", "nap", json!({ "ms": 120 }), &[], true),
                tool_step("b", "nap", json!({ "ms": 120 }), &[], true),
                tool_step("c", "nap", json!({ "ms": 120 }), &["a", "b"], false),
            ],
        }],
    };

    let started = Instant::now();
    let report = executor.run_plan(&plan, &session).await;
    let elapsed = started.elapsed();

    assert!(report.succeeded());
    assert_eq!(report.steps.len(), 3);
    // Two waves of ~120ms each; fully serial would be 360ms+.
    assert!(elapsed >= Duration::from_millis(240));
    assert!(elapsed < Duration::from_millis(420), "took {:?}", elapsed);
    // The dependent step completes last.
    assert_eq!(report.steps[2].step_id, "c");
}

#[tokio::test]
async fn dependent_step_is_skipped_when_its_dependency_fails() {
    let executor = executor();
    let session = SessionInfo::new("u-plan", "s-plan");

    let plan = ExecutionPlan {
        groups: vec![ExecutionGroup {
            intent_addressed: "doomed chain".to_string(),
            steps: vec![
                tool_step("boom", "panics", json!({}), &[], false),
                tool_step("after", "weather", json!({ "city": "Paris" }), &["boom"], false),
                tool_step("independent", "weather", json!({ "city": "Oslo" }), &[], false),
            ],
        }],
    };

    let report = executor.run_plan(&plan, &session).await;
    assert_eq!(report.steps.len(), 3);
    assert!(!report.succeeded());

    let by_id = |id: &str| report.steps.iter().find(|s| s.step_id == id).unwrap();
    assert!(!by_id("boom").result.is_success());
    assert!(!by_id("after").result.is_success());
    assert!(by_id("after").result.message.contains("dependency"));
    assert!(by_id("independent").result.is_success());
}

#[tokio::test]
async fn narrative_steps_resolve_without_touching_tools() {
    let executor = executor();
    let session = SessionInfo::new("u-plan", "s-plan");

    let plan = ExecutionPlan {
        groups: vec![
            ExecutionGroup {
                intent_addressed: "prep".to_string(),
                steps: vec![narrative("intro", "Here is how we will proceed.")],
            },
            ExecutionGroup {
                intent_addressed: "work".to_string(),
                steps: vec![tool_step("w", "weather", json!({ "city": "Paris" }), &[], false)],
            },
        ],
    };

    let report = executor.run_plan(&plan, &session).await;
    assert!(report.succeeded());
    assert_eq!(report.steps[0].tool_name, None);
    assert_eq!(report.steps[0].result.message, "Here is how we will proceed.");
    assert_eq!(report.steps[1].tool_name.as_deref(), Some("weather"));
}

#[tokio::test]
async fn groups_execute_in_order_and_later_groups_see_earlier_results() {
    let executor = executor();
    let session = SessionInfo::new("u-plan", "s-plan");

    let plan = ExecutionPlan {
        groups: vec![
            ExecutionGroup {
                intent_addressed: "first".to_string(),
                steps: vec![tool_step("one", "weather", json!({ "city": "Paris" }), &[], false)],
            },
            ExecutionGroup {
                intent_addressed: "second".to_string(),
                steps: vec![tool_step("two", "weather", json!({ "city": "Oslo" }), &["one"], false)],
            },
        ],
    };

    let report = executor.run_plan(&plan, &session).await;
    assert!(report.succeeded());
    assert_eq!(report.steps[0].group_index, 0);
    assert_eq!(report.steps[1].group_index, 1);
}
