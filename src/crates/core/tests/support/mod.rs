#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use aria_agent_tools::{Tool, ToolError, ToolOutput, ToolUseContext};
use aria_core::{AriaError, AriaResult, CompletionClient, CompletionRequest};

/// Completion client scripted per caller id, with call counting so tests
/// can assert which pipeline stages ran.
#[derive(Default)]
pub struct ScriptedCompletionClient {
    responses: Mutex<HashMap<String, VecDeque<Value>>>,
    total: AtomicUsize,
    per_caller: Mutex<HashMap<String, usize>>,
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, caller: &str, response: Value) {
        self.responses
            .lock()
            .unwrap()
            .entry(caller.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, caller: &str) -> usize {
        self.per_caller
            .lock()
            .unwrap()
            .get(caller)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> AriaResult<Value> {
        let caller = request
            .caller_id
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .per_caller
            .lock()
            .unwrap()
            .entry(caller.clone())
            .or_default() += 1;

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&caller)
            .and_then(|queue| queue.pop_front());
        next.ok_or_else(|| AriaError::upstream(format!("no scripted response for '{}'", caller)))
    }
}

/// Deterministic weather lookups, counting handler invocations.
pub struct WeatherTool {
    pub invocations: Arc<AtomicUsize>,
}

impl WeatherTool {
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> String {
        "Get current weather for a city".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": { "type": "string", "minLength": 1 },
                "units": { "type": "string", "enum": ["metric", "imperial"] }
            },
            "required": ["city"],
            "additionalProperties": false
        })
    }

    fn aliases(&self) -> Vec<String> {
        vec!["forecast".to_string()]
    }

    async fn execute(
        &self,
        input: &Value,
        _context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let city = input
            .get("city")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::new("city is required"))?;

        let temperature = match city {
            "Paris" => 21,
            "London" => 17,
            "Oslo" => 9,
            _ => return Ok(ToolOutput::failed(format!("No forecast available for {}", city))),
        };

        Ok(ToolOutput::structured(
            format!("{}°C in {}", temperature, city),
            json!({ "city": city, "temperatureC": temperature, "condition": "clear" }),
        ))
    }
}

/// Always disabled; the handler must never run.
pub struct DisabledEchoTool {
    pub invocations: Arc<AtomicUsize>,
}

impl DisabledEchoTool {
    pub fn new() -> Self {
        Self {
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Tool for DisabledEchoTool {
    fn name(&self) -> &str {
        "echo_disabled"
    }

    fn description(&self) -> String {
        "Echo (turned off)".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        })
    }

    fn enabled(&self) -> bool {
        false
    }

    async fn execute(
        &self,
        input: &Value,
        _context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(ToolOutput::text(
            input.get("text").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        ))
    }
}

/// Sleeps far past its budget and ignores the cancellation token.
pub struct SlowTool;

#[async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow"
    }

    fn description(&self) -> String {
        "Sleeps well past its own timeout".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn timeout_ms(&self) -> Option<u64> {
        Some(100)
    }

    async fn execute(
        &self,
        _input: &Value,
        _context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(ToolOutput::text("finally done"))
    }
}

/// Observes its cancellation token, recording that the cancel arrived.
pub struct CancelAwareTool {
    pub saw_cancel: Arc<AtomicBool>,
}

impl CancelAwareTool {
    pub fn new() -> Self {
        Self {
            saw_cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl Tool for CancelAwareTool {
    fn name(&self) -> &str {
        "cancel_aware"
    }

    fn description(&self) -> String {
        "Stops promptly when cancelled".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn timeout_ms(&self) -> Option<u64> {
        Some(100)
    }

    async fn execute(
        &self,
        _input: &Value,
        context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        tokio::select! {
            _ = context.cancellation_token.cancelled() => {
                self.saw_cancel.store(true, Ordering::SeqCst);
                Ok(ToolOutput::failed("cancelled"))
            }
            _ = tokio::time::sleep(Duration::from_secs(2)) => {
                Ok(ToolOutput::text("slept through"))
            }
        }
    }
}

/// Panics inside the handler; the executor must contain it.
pub struct PanicTool;

#[async_trait]
impl Tool for PanicTool {
    fn name(&self) -> &str {
        "panics"
    }

    fn description(&self) -> String {
        "Crashes on purpose".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(
        &self,
        _input: &Value,
        _context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        panic!("deliberate test panic");
    }
}

/// Sleeps for the requested number of milliseconds, then succeeds.
pub struct NapTool;

#[async_trait]
impl Tool for NapTool {
    fn name(&self) -> &str {
        "nap"
    }

    fn description(&self) -> String {
        "Sleep briefly then report".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "ms": { "type": "integer", "minimum": 0 } }
        })
    }

    async fn execute(
        &self,
        input: &Value,
        _context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        let ms = input.get("ms").and_then(|v| v.as_u64()).unwrap_or(120);
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(ToolOutput::text(format!("napped {}ms", ms)))
    }
}
