// Aria agent tool contracts: the Tool trait plus the per-call context and
// result shapes exchanged between the registry, the executor and handlers.

mod context;

use async_trait::async_trait;
use serde_json::Value;

pub use context::{SessionInfo, ToolUseContext};

/// Error returned by a tool handler that could not complete at all. A
/// handler that completed but wants to report a domain error should return
/// `ToolOutput` with `error` set instead.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ToolError(pub String);

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Heterogeneous handler return shape. The executor normalizes this into
/// the wire-level result.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub result: Option<String>,
    pub error: Option<String>,
    pub structured_data: Option<Value>,
}

impl ToolOutput {
    pub fn text(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            ..Default::default()
        }
    }

    pub fn structured(result: impl Into<String>, data: Value) -> Self {
        Self {
            result: Some(result.into()),
            error: None,
            structured_data: Some(data),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Cheap pre-execution check result. Authoritative schema validation
/// happens in the executor; this hook exists for tool-specific constraints
/// a JSON schema cannot express.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub result: bool,
    pub message: Option<String>,
    pub error_code: Option<u16>,
    pub meta: Option<Value>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            result: true,
            message: None,
            error_code: None,
            meta: None,
        }
    }
}

impl ValidationResult {
    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            result: false,
            message: Some(message.into()),
            error_code: Some(400),
            meta: None,
        }
    }
}

/// A named, schema-validated capability the assistant can invoke.
///
/// Handlers receive the cancellation token through the context up front; it
/// is the handler's responsibility to observe it. The executor returns its
/// own timeout response regardless of whether the handler has stopped.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> String;

    /// JSON schema for the tool's arguments.
    fn input_schema(&self) -> Value;

    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    /// Per-tool wall-clock budget; `None` falls back to the process-wide
    /// default.
    fn timeout_ms(&self) -> Option<u64> {
        None
    }

    fn enabled(&self) -> bool {
        true
    }

    /// Advisory rate limit (calls per minute); enforcement lives at the
    /// deployment boundary, not in the executor.
    fn rate_limit_per_minute(&self) -> Option<u32> {
        None
    }

    /// Advisory per-session call ceiling; same enforcement caveat.
    fn max_calls_per_session(&self) -> Option<u32> {
        None
    }

    async fn validate_input(
        &self,
        _input: &Value,
        _context: Option<&ToolUseContext>,
    ) -> ValidationResult {
        ValidationResult::default()
    }

    async fn execute(
        &self,
        input: &Value,
        context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError>;
}
