use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("malformed response: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl WorkflowError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Transport(_) => "transport",
            WorkflowError::Status { .. } => "status",
            WorkflowError::Protocol(_) => "protocol",
            WorkflowError::InvalidBaseUrl(_) => "config",
        }
    }
}
