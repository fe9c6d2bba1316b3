use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Disabled,
    InvalidArguments,
    Timeout,
    Internal,
    UpstreamUnavailable,
}

/// One schema violation, kept structured so callers can render
/// field-specific errors instead of a reworded summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentViolation {
    /// JSON pointer into the offending argument value ("" for the root).
    pub path: String,
    /// Schema keyword that failed (e.g. "required", "type").
    pub rule: String,
    pub message: String,
}

/// Terminal value of one tool invocation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub status: ToolStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Optional detailed error; `message` stays short and non-technical.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ArgumentViolation>,
}

impl ToolCallResult {
    pub fn success(message: impl Into<String>, structured_data: Option<Value>) -> Self {
        Self {
            status: ToolStatus::Success,
            message: message.into(),
            structured_data,
            error_kind: None,
            error: None,
            violations: Vec::new(),
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            message: message.into(),
            structured_data: None,
            error_kind: Some(kind),
            error: detail,
            violations: Vec::new(),
        }
    }

    pub fn invalid_arguments(message: impl Into<String>, violations: Vec<ArgumentViolation>) -> Self {
        Self {
            status: ToolStatus::Error,
            message: message.into(),
            structured_data: None,
            error_kind: Some(ErrorKind::InvalidArguments),
            error: None,
            violations,
        }
    }

    /// Handler completed but reported an error of its own. Not an executor
    /// failure, so no error kind is attached.
    pub fn handler_error(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            message: message.into(),
            structured_data: None,
            error_kind: None,
            error: None,
            violations: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}
