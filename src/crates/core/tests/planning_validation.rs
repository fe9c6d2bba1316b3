mod support;

use std::sync::Arc;

use aria_core::agentic::planning::{
    ExecutionGroup, FocusModePlan, ToolOrchestration,
};
use aria_core::{AriaError, ExecutionPlan, ExecutionStep, Plan, ToolRegistry};
use serde_json::json;

use support::WeatherTool;

fn registry() -> ToolRegistry {
    ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build()
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

fn plan_of(steps: Vec<ExecutionStep>) -> ExecutionPlan {
    ExecutionPlan {
        groups: vec![ExecutionGroup {
            intent_addressed: "test".to_string(),
            steps,
        }],
    }
}

#[test]
fn valid_plan_passes() {
    let plan = plan_of(vec![
        tool_step("a", "weather", json!({ "city": "Paris" }), &[], true),
        tool_step("b", "weather", json!({ "city": "London" }), &[], true),
        tool_step("c", "weather", json!({ "city": "Oslo" }), &["a", "b"], false),
    ]);
    assert!(plan.validate(&registry()).is_ok());
}

#[test]
fn dependency_cycle_is_rejected() {
    let plan = plan_of(vec![
        tool_step("a", "weather", json!({ "city": "Paris" }), &["b"], false),
        tool_step("b", "weather", json!({ "city": "Oslo" }), &["a"], false),
    ]);
    let error = plan.validate(&registry()).unwrap_err();
    assert!(matches!(error, AriaError::Validation(_)));
    assert!(error.to_string().contains("cycle"));
}

#[test]
fn unknown_dependency_target_is_rejected() {
    let plan = plan_of(vec![tool_step(
        "a",
        "weather",
        json!({ "city": "Paris" }),
        &["ghost"],
        false,
    )]);
    assert!(plan.validate(&registry()).is_err());
}

#[test]
fn parallel_steps_must_not_depend_on_each_other() {
    let plan = plan_of(vec![
        tool_step("a", "weather", json!({ "city": "Paris" }), &[], true),
        tool_step("b", "weather", json!({ "city": "Oslo" }), &["a"], true),
    ]);
    let error = plan.validate(&registry()).unwrap_err();
    assert!(error.to_string().contains("parallel"));
}

#[test]
fn unknown_tool_is_rejected() {
    let plan = plan_of(vec![tool_step("a", "time_travel", json!({}), &[], false)]);
    let error = plan.validate(&registry()).unwrap_err();
    assert!(error.to_string().contains("time_travel"));
}

#[test]
fn missing_required_argument_is_rejected() {
    let plan = plan_of(vec![tool_step("a", "weather", json!({}), &[], false)]);
    let error = plan.validate(&registry()).unwrap_err();
    assert!(error.to_string().contains("city"));
}

#[test]
fn dependency_on_a_later_group_is_rejected() {
    let plan = ExecutionPlan {
        groups: vec![
            ExecutionGroup {
                intent_addressed: "first".to_string(),
                steps: vec![tool_step("a", "weather", json!({ "city": "Paris" }), &["b"], false)],
            },
            ExecutionGroup {
                intent_addressed: "second".to_string(),
                steps: vec![tool_step("b", "weather", json!({ "city": "Oslo" }), &[], false)],
            },
        ],
    };
    let error = plan.validate(&registry()).unwrap_err();
    assert!(error.to_string().contains("later group"));
}

#[test]
fn duplicate_step_ids_are_rejected() {
    let plan = plan_of(vec![
        tool_step("a", "weather", json!({ "city": "Paris" }), &[], false),
        tool_step("a", "weather", json!({ "city": "Oslo" }), &[], false),
    ]);
    let error = plan.validate(&registry()).unwrap_err();
    assert!(error.to_string().contains("duplicate"));
}

#[test]
fn focus_plan_projects_parallel_group_then_followup() {
    let plan = Plan::FocusMode(FocusModePlan {
        activity: "writing".to_string(),
        duration_minutes: Some(25),
        tool_orchestration: ToolOrchestration {
            parallel_group: vec![
                tool_step("step-1", "weather", json!({ "city": "Paris" }), &[], true),
                tool_step("step-2", "weather", json!({ "city": "Oslo" }), &[], true),
            ],
            followup: vec![tool_step(
                "step-3",
                "weather",
                json!({ "city": "London" }),
                &["step-1"],
                false,
            )],
        },
    });

    let execution = plan.to_execution_steps();
    assert_eq!(execution.groups.len(), 2);
    assert!(execution.groups[0].intent_addressed.contains("writing"));
    assert_eq!(execution.groups[0].steps.len(), 2);
    assert!(execution.groups[0].steps.iter().all(|s| s.is_parallel()));
    assert_eq!(execution.groups[1].steps.len(), 1);
    assert!(execution.validate(&registry()).is_ok());
}
