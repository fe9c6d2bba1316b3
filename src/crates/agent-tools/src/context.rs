use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Caller identity shared by every tool call in one request. Cheap to clone;
/// each `tool_context` mint gets its own cancellation token.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub user_id: String,
    pub session_id: String,
    pub locale: Option<String>,
    pub ip_address: Option<String>,
    pub geo: Option<String>,
    pub user_name: Option<String>,
}

impl SessionInfo {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            locale: None,
            ip_address: None,
            geo: None,
            user_name: None,
        }
    }

    /// Mint a fresh per-call context. Tokens are never reused across calls.
    pub fn tool_context(&self) -> ToolUseContext {
        self.tool_context_inner(CancellationToken::new())
    }

    /// Mint a per-call context whose token is a child of an outer
    /// request-level token, so an outer cancel also stops this call.
    pub fn tool_context_with_parent(&self, parent: &CancellationToken) -> ToolUseContext {
        self.tool_context_inner(parent.child_token())
    }

    fn tool_context_inner(&self, cancellation_token: CancellationToken) -> ToolUseContext {
        ToolUseContext {
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
            locale: self.locale.clone(),
            ip_address: self.ip_address.clone(),
            geo: self.geo.clone(),
            user_name: self.user_name.clone(),
            run_id: uuid::Uuid::new_v4().to_string(),
            cancellation_token,
            started_at: Utc::now(),
        }
    }
}

/// Per-invocation run context. Owned exclusively by one tool call and
/// discarded when it completes.
#[derive(Debug, Clone)]
pub struct ToolUseContext {
    pub user_id: String,
    pub session_id: String,
    pub locale: Option<String>,
    pub ip_address: Option<String>,
    pub geo: Option<String>,
    pub user_name: Option<String>,
    pub run_id: String,
    pub cancellation_token: CancellationToken,
    pub started_at: DateTime<Utc>,
}

impl ToolUseContext {
    /// Bare context for tests and internal calls.
    pub fn for_session(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        SessionInfo::new(user_id, session_id).tool_context()
    }
}
