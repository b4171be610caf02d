//! Harness error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use shared::StartTestResponse;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("HTTP server startup failed: {0}")]
    ServerStartup(String),

    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("Unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Concurrency {requested} must be at least 1")]
    ConcurrencyTooLow { requested: i64 },

    #[error("Concurrency {requested} outside 1..={max}")]
    ConcurrencyOutOfRange { requested: i64, max: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HarnessError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::InvalidRequest { details: details.into() }
    }

    pub fn websocket(message: impl Into<String>) -> Self {
        Self::WebSocket(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status reported when this error escapes a handler
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. }
            | Self::UnsupportedMethod { .. }
            | Self::InvalidEndpoint { .. }
            | Self::ConcurrencyTooLow { .. }
            | Self::ConcurrencyOutOfRange { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HarnessError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(StartTestResponse::error(self.to_string()))).into_response()
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Failure of a single streamed session
///
/// Never crosses the session boundary: the runner turns it into a terminal
/// `ERROR:` event for that session index.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The per-session ceiling elapsed before the stream finished
    #[error("요청 시간 초과 (10분)")]
    Timeout,

    /// Connection, protocol or body-read failure
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// The request could not be built (bad header name/value, unusable URL)
    #[error("{0}")]
    Request(String),

    /// The session task died before reporting
    #[error("session aborted: {0}")]
    Aborted(String),
}

impl SessionError {
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error)
        }
    }
}
