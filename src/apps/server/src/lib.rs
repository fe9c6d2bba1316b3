//! Aria HTTP surface
//!
//! Thin transport layer over the orchestration core: requests map 1:1 onto
//! `execute`/`execute_batch`/`handle_turn`, responses are
//! `{status, message, data, error}` bodies, and error kinds map onto HTTP
//! status codes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use aria_agent_tools::SessionInfo;
use aria_core::agentic::tools::implementations::{
    CancelReminderTool, ClockTool, CreateReminderTool, ListRemindersTool, RecallMemoryTool,
    ReminderStore,
};
use aria_core::{
    AriaError, AriaResult, BatchToolCall, MemorySearch, Orchestrator, ToolRegistry, TurnOutcome,
    TurnRequest,
};
use aria_core_types::{ErrorKind, ToolCallResult, ToolStatus};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// The built-in tool set every deployment starts from.
pub fn build_registry(memory: Arc<dyn MemorySearch>) -> AriaResult<ToolRegistry> {
    let reminders = Arc::new(ReminderStore::new());
    Ok(ToolRegistry::builder()
        .register(Arc::new(ClockTool::new()))?
        .register(Arc::new(CreateReminderTool::new(reminders.clone())))?
        .register(Arc::new(ListRemindersTool::new(reminders.clone())))?
        .register(Arc::new(CancelReminderTool::new(reminders)))?
        .register(Arc::new(RecallMemoryTool::new(memory)))?
        .build())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/tools/execute",
            post(execute_tool).fallback(method_not_allowed),
        )
        .route(
            "/api/tools/batch",
            post(execute_batch).fallback(method_not_allowed),
        )
        .route("/api/turn", post(handle_turn).fallback(method_not_allowed))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data,
            error: None,
        }
    }

    fn error(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            data: None,
            error,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteToolRequest {
    tool_name: String,
    #[serde(default)]
    tool_args: Option<Value>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteBatchRequest {
    tool_calls: Vec<BatchToolCall>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

fn session_info(user_id: Option<String>, session_id: Option<String>) -> SessionInfo {
    SessionInfo::new(
        user_id.unwrap_or_else(|| "anonymous".to_string()),
        session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    )
}

/// Map a tool result onto the HTTP status the boundary promises.
fn status_for(result: &ToolCallResult) -> StatusCode {
    if result.status == ToolStatus::Success {
        return StatusCode::OK;
    }
    match result.error_kind {
        Some(ErrorKind::NotFound) => StatusCode::NOT_FOUND,
        Some(ErrorKind::Disabled) => StatusCode::FORBIDDEN,
        Some(ErrorKind::InvalidArguments) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::Timeout) => StatusCode::REQUEST_TIMEOUT,
        Some(ErrorKind::Internal) | Some(ErrorKind::UpstreamUnavailable) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        // The handler completed and reported a domain error; the transport
        // call itself worked.
        None => StatusCode::OK,
    }
}

fn status_for_error(error: &AriaError) -> StatusCode {
    match error.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Disabled => StatusCode::FORBIDDEN,
        ErrorKind::InvalidArguments => StatusCode::BAD_REQUEST,
        ErrorKind::Timeout => StatusCode::REQUEST_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn tool_result_body(result: ToolCallResult) -> ApiResponse {
    let data = if result.violations.is_empty() {
        result.structured_data
    } else {
        Some(json!({ "violations": result.violations }))
    };
    match result.status {
        ToolStatus::Success => ApiResponse::success(result.message, data),
        ToolStatus::Error => ApiResponse {
            status: "error",
            message: result.message,
            data,
            error: result.error,
        },
    }
}

async fn execute_tool(
    State(state): State<AppState>,
    Json(request): Json<ExecuteToolRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let session = session_info(request.user_id, request.session_id);
    let result = state
        .orchestrator
        .executor()
        .execute(&request.tool_name, request.tool_args, session.tool_context())
        .await;

    (status_for(&result), Json(tool_result_body(result)))
}

async fn execute_batch(
    State(state): State<AppState>,
    Json(request): Json<ExecuteBatchRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let session = session_info(request.user_id, request.session_id);
    let results = state
        .orchestrator
        .executor()
        .execute_batch(request.tool_calls, &session)
        .await;

    let data = match serde_json::to_value(&results) {
        Ok(data) => data,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Batch results did not serialize.", Some(e.to_string()))),
            );
        }
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            format!("Executed {} tool call(s).", results.len()),
            Some(data),
        )),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnApiRequest {
    #[serde(flatten)]
    turn: TurnRequest,
    /// When set, a planned turn is also run through the executor and the
    /// step report attached to the response.
    #[serde(default)]
    execute: bool,
}

async fn handle_turn(
    State(state): State<AppState>,
    Json(request): Json<TurnApiRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let session = session_info(request.turn.user_id.clone(), request.turn.session_id.clone());

    let outcome = match state.orchestrator.handle_turn(request.turn).await {
        Ok(outcome) => outcome,
        Err(error) => {
            return (
                status_for_error(&error),
                Json(ApiResponse::error(
                    "I couldn't process that request.",
                    Some(error.to_string()),
                )),
            );
        }
    };

    let report = match (&outcome, request.execute) {
        (TurnOutcome::Planned { execution_plan, .. }, true) => Some(
            state
                .orchestrator
                .executor()
                .run_plan(execution_plan, &session)
                .await,
        ),
        _ => None,
    };

    let mut data = match serde_json::to_value(&outcome) {
        Ok(data) => data,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Turn outcome did not serialize.", Some(e.to_string()))),
            );
        }
    };
    if let Some(report) = report {
        match serde_json::to_value(&report) {
            Ok(report) => {
                data["executionReport"] = report;
            }
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Execution report did not serialize.", Some(e.to_string()))),
                );
            }
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success("Turn processed.", Some(data))),
    )
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok", "core": aria_core::CORE_NAME, "version": aria_core::VERSION }))
}

async fn method_not_allowed() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiResponse::error("Method Not Allowed", None)),
    )
}

async fn not_found() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("No such endpoint.", None)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_promised_status_codes() {
        let cases = [
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::Disabled, StatusCode::FORBIDDEN),
            (ErrorKind::InvalidArguments, StatusCode::BAD_REQUEST),
            (ErrorKind::Timeout, StatusCode::REQUEST_TIMEOUT),
            (ErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorKind::UpstreamUnavailable, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, expected) in cases {
            let result = ToolCallResult::error(kind, "m", None);
            assert_eq!(status_for(&result), expected);
        }
    }

    #[test]
    fn handler_domain_errors_stay_http_200() {
        let result = ToolCallResult::handler_error("no reminder found");
        assert_eq!(status_for(&result), StatusCode::OK);
    }
}
