use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong while serving a chat request.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid chat request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("Missing credential: {0} is not configured")]
    MissingCredential(&'static str),

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(reqwest::Error),

    #[error("Upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Upstream returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Upstream response has no readable body")]
    NoReadableBody,

    #[error("Upstream stream failed: {0}")]
    Stream(reqwest::Error),

    #[error("Upstream stream idle for {0:?}")]
    StreamIdle(Duration),
}

impl ChatError {
    /// Status code used when per-variant statuses are enabled.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ChatError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ChatError::UpstreamTimeout(_) | ChatError::StreamIdle(_) => StatusCode::GATEWAY_TIMEOUT,
            ChatError::UpstreamStatus { .. }
            | ChatError::NoReadableBody
            | ChatError::Stream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::UpstreamUnreachable(err)
    }
}
