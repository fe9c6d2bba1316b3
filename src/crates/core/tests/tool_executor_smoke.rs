mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aria_agent_tools::ToolUseContext;
use aria_core::{OrchestratorConfig, ToolExecutor, ToolRegistry};
use aria_core_types::{ErrorKind, ToolStatus};
use serde_json::json;

use support::{CancelAwareTool, DisabledEchoTool, PanicTool, SlowTool, WeatherTool};

fn executor_with(registry: ToolRegistry) -> ToolExecutor {
    ToolExecutor::new(Arc::new(registry), Arc::new(OrchestratorConfig::default()))
}

fn ctx() -> ToolUseContext {
    ToolUseContext::for_session("u-test", "s-test")
}

#[tokio::test]
async fn weather_with_valid_city_succeeds() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    let result = executor
        .execute("weather", Some(json!({ "city": "Paris" })), ctx())
        .await;

    assert_eq!(result.status, ToolStatus::Success);
    assert!(result.structured_data.is_some());
    assert!(result.error.is_none());
    let data = result.structured_data.unwrap();
    assert_eq!(data["city"], "Paris");
    assert_eq!(data["temperatureC"], 21);
}

#[tokio::test]
async fn missing_required_argument_reports_structured_violation() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    let result = executor.execute("weather", Some(json!({})), ctx()).await;

    assert_eq!(result.status, ToolStatus::Error);
    assert_eq!(result.error_kind, Some(ErrorKind::InvalidArguments));
    assert!(!result.violations.is_empty());
    assert!(result.violations.iter().any(|v| v.message.contains("city")));
}

#[tokio::test]
async fn null_arguments_default_to_empty_object() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    // No args at all behaves like {}, which is still a violation for weather.
    let result = executor.execute("weather", None, ctx()).await;
    assert_eq!(result.error_kind, Some(ErrorKind::InvalidArguments));
}

#[tokio::test]
async fn unknown_tool_yields_not_found() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    let result = executor.execute("teleport", None, ctx()).await;
    assert_eq!(result.error_kind, Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn alias_resolves_to_the_same_tool() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    let result = executor
        .execute("forecast", Some(json!({ "city": "London" })), ctx())
        .await;
    assert_eq!(result.status, ToolStatus::Success);
}

#[tokio::test]
async fn disabled_tool_short_circuits_before_validation_and_handler() {
    let tool = Arc::new(DisabledEchoTool::new());
    let invocations = tool.invocations.clone();
    let registry = ToolRegistry::builder().register(tool).unwrap().build();
    let executor = executor_with(registry);

    // Arguments are valid; disabled state must still win, without leaking
    // schema feedback.
    let result = executor
        .execute("echo_disabled", Some(json!({ "text": "hello" })), ctx())
        .await;

    assert_eq!(result.status, ToolStatus::Error);
    assert_eq!(result.error_kind, Some(ErrorKind::Disabled));
    assert!(result.violations.is_empty());
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn timeout_returns_within_budget_even_if_handler_never_stops() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(SlowTool))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    let started = Instant::now();
    let result = executor.execute("slow", None, ctx()).await;
    let elapsed = started.elapsed();

    assert_eq!(result.error_kind, Some(ErrorKind::Timeout));
    // Budget is 100ms; allow generous epsilon for a loaded runner.
    assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);
    assert!(result.error.as_deref().unwrap_or("").contains("100ms"));
}

#[tokio::test]
async fn timeout_cancels_the_handler_token() {
    let tool = Arc::new(CancelAwareTool::new());
    let saw_cancel = tool.saw_cancel.clone();
    let registry = ToolRegistry::builder().register(tool).unwrap().build();
    let executor = executor_with(registry);

    let result = executor.execute("cancel_aware", None, ctx()).await;
    assert_eq!(result.error_kind, Some(ErrorKind::Timeout));

    // The detached handler observes the cancel shortly after.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(saw_cancel.load(Ordering::SeqCst));
}

#[tokio::test]
async fn handler_panic_is_contained_as_internal_error() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(PanicTool))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    let result = executor.execute("panics", None, ctx()).await;
    assert_eq!(result.error_kind, Some(ErrorKind::Internal));
    assert!(result.error.as_deref().unwrap_or("").contains("deliberate test panic"));
}

#[tokio::test]
async fn handler_reported_error_is_error_status_without_kind() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    // Completed call, domain-level failure: unknown city.
    let result = executor
        .execute("weather", Some(json!({ "city": "Atlantis" })), ctx())
        .await;

    assert_eq!(result.status, ToolStatus::Error);
    assert_eq!(result.error_kind, None);
    assert!(result.message.contains("Atlantis"));
}

#[tokio::test]
async fn identical_calls_produce_structurally_identical_results() {
    let registry = ToolRegistry::builder()
        .register(Arc::new(WeatherTool::new()))
        .unwrap()
        .build();
    let executor = executor_with(registry);

    let first = executor
        .execute("weather", Some(json!({ "city": "Oslo" })), ctx())
        .await;
    let second = executor
        .execute("weather", Some(json!({ "city": "Oslo" })), ctx())
        .await;

    assert_eq!(first, second);
}
