use aria_core_types::{ArgumentViolation, ErrorKind};

pub type AriaResult<T> = Result<T, AriaError>;

#[derive(Debug, thiserror::Error)]
pub enum AriaError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Tool disabled: {0}")]
    Disabled(String),

    #[error("Invalid arguments: {}", format_violations(.violations))]
    InvalidArguments { violations: Vec<ArgumentViolation> },

    #[error("Timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl AriaError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Wire-level error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AriaError::NotFound(_) => ErrorKind::NotFound,
            AriaError::Disabled(_) => ErrorKind::Disabled,
            AriaError::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            AriaError::Timeout { .. } => ErrorKind::Timeout,
            AriaError::Internal(_) => ErrorKind::Internal,
            AriaError::Upstream(_) => ErrorKind::UpstreamUnavailable,
            AriaError::Validation(_) => ErrorKind::Internal,
        }
    }
}

fn format_violations(violations: &[ArgumentViolation]) -> String {
    violations
        .iter()
        .map(|v| {
            if v.path.is_empty() {
                v.message.clone()
            } else {
                format!("{}: {}", v.path, v.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
