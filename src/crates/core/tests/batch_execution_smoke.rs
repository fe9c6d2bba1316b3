mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use aria_agent_tools::SessionInfo;
use aria_core::{BatchToolCall, OrchestratorConfig, ToolExecutor, ToolRegistry};
use aria_core_types::{ErrorKind, ToolStatus};
use serde_json::json;

use support::{NapTool, PanicTool, WeatherTool};

fn executor() -> ToolExecutor {
    let registry = ToolRegistry::builder()
        .register(Arc::new(NapTool))
        .unwrap()
        .register(Arc::new(PanicTool))
        .unwrap()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build();
    ToolExecutor::new(Arc::new(registry), Arc::new(OrchestratorConfig::default()))
}

fn call(tool_name: &str, arguments: serde_json::Value) -> BatchToolCall {
    BatchToolCall {
        tool_name: tool_name.to_string(),
        arguments: Some(arguments),
    }
}

#[tokio::test]
async fn one_failure_does_not_affect_the_other_entries() {
    let executor = executor();
    let session = SessionInfo::new("u-batch", "s-batch");

    let results = executor
        .execute_batch(
            vec![
                call("weather", json!({ "city": "Paris" })),
                call("panics", json!({})),
                call("weather", json!({ "city": "London" })),
            ],
            &session,
        )
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, ToolStatus::Success);
    assert_eq!(results[1].error_kind, Some(ErrorKind::Internal));
    assert_eq!(results[2].status, ToolStatus::Success);
    // Order matches input, not completion time.
    assert_eq!(results[0].structured_data.as_ref().unwrap()["city"], "Paris");
    assert_eq!(results[2].structured_data.as_ref().unwrap()["city"], "London");
}

#[tokio::test]
async fn unknown_tool_in_batch_reports_not_found_in_place() {
    let executor = executor();
    let session = SessionInfo::new("u-batch", "s-batch");

    let results = executor
        .execute_batch(
            vec![
                call("nap", json!({ "ms": 10 })),
                call("no_such_tool", json!({})),
                call("nap", json!({ "ms": 10 })),
            ],
            &session,
        )
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[1].error_kind, Some(ErrorKind::NotFound));
    assert!(results[0].is_success() && results[2].is_success());
}

#[tokio::test]
async fn batch_runs_concurrently_not_serially() {
    let executor = executor();
    let session = SessionInfo::new("u-batch", "s-batch");

    let started = Instant::now();
    let results = executor
        .execute_batch(
            vec![
                call("nap", json!({ "ms": 120 })),
                call("nap", json!({ "ms": 120 })),
                call("nap", json!({ "ms": 120 })),
            ],
            &session,
        )
        .await;
    let elapsed = started.elapsed();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.is_success()));
    // Slowest call plus fixed overhead; three serial naps would be 360ms+.
    assert!(elapsed >= Duration::from_millis(120));
    assert!(elapsed < Duration::from_millis(300), "took {:?}", elapsed);
}
