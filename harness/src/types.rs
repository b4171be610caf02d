//! Type definitions for the harness
//!
//! Domain types validated from the wire messages in `shared`, plus the
//! per-session progress values that flow from runners to subscribers.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{ServerMessage, StartTestRequest, SubscriberId};
use url::Url;

use crate::config::HarnessConfig;
use crate::core::CompletionSentinels;
use crate::error::{HarnessError, HarnessResult};

/// HTTP verbs a test may use against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Only these verbs ever send the request body
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(HarnessError::UnsupportedMethod { method: s.to_string() }),
        }
    }
}

/// Payload sent with each session's request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured object, sent as `application/json`
    Json(Value),
    /// Anything else, sent as raw bytes
    Raw(String),
}

impl RequestBody {
    /// Objects are always JSON; other falsy values (null, "", 0, false, []) send no body
    pub fn from_value(value: Option<Value>) -> Option<Self> {
        match value? {
            Value::Null => None,
            Value::Bool(false) => None,
            Value::String(text) if text.is_empty() => None,
            Value::Array(items) if items.is_empty() => None,
            Value::Number(number) if number.as_f64() == Some(0.0) => None,
            Value::Object(map) => Some(RequestBody::Json(Value::Object(map))),
            Value::String(text) => Some(RequestBody::Raw(text)),
            other => Some(RequestBody::Raw(other.to_string())),
        }
    }
}

/// A validated start-test request
#[derive(Debug, Clone)]
pub struct TestRequest {
    pub concurrency: u32,
    /// Target URL; relative endpoints without a configured base are kept verbatim
    pub endpoint: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
    pub subscriber: Option<SubscriberId>,
    pub sentinels: CompletionSentinels,
}

impl TestRequest {
    /// Validate a wire request against the harness configuration
    pub fn from_wire(raw: StartTestRequest, config: &HarnessConfig) -> HarnessResult<Self> {
        if raw.concurrency < 1 {
            return Err(HarnessError::ConcurrencyTooLow { requested: raw.concurrency });
        }
        if let Some(max) = config.max_concurrency {
            if raw.concurrency > i64::from(max) {
                return Err(HarnessError::ConcurrencyOutOfRange { requested: raw.concurrency, max });
            }
        }
        let concurrency = u32::try_from(raw.concurrency)
            .map_err(|e| HarnessError::invalid_request(e.to_string()))?;

        let method: HttpMethod = raw.method.parse()?;
        let endpoint = resolve_endpoint(&raw.endpoint, config.target_base_url.as_ref())?;

        Ok(Self {
            concurrency,
            endpoint,
            method,
            headers: raw.headers,
            body: RequestBody::from_value(raw.body),
            subscriber: raw.ws_id,
            sentinels: CompletionSentinels::new(raw.end_flags),
        })
    }
}

fn resolve_endpoint(endpoint: &str, base: Option<&Url>) -> HarnessResult<String> {
    match Url::parse(endpoint) {
        Ok(url) => Ok(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base
                .join(endpoint)
                .map(|url| url.to_string())
                .map_err(|e| HarnessError::InvalidEndpoint {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(endpoint.to_string()),
        },
        Err(e) => Err(HarnessError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Lifecycle of one session; every state but `Running` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Running,
    CompletedBySentinel,
    CompletedByStreamEnd,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

/// One progress report for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub session_index: u32,
    pub status: SessionStatus,
    pub rendered_text: String,
    pub chunk_count: u32,
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Frame pushed to the subscriber for this event
    pub fn to_server_message(&self) -> ServerMessage {
        ServerMessage::Progress {
            session: self.session_index,
            response: self.rendered_text.clone(),
        }
    }
}

/// Outcome of one test invocation, kept server side for logging and status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReport {
    pub sessions: u32,
    pub completed_by_sentinel: u32,
    pub completed_by_stream_end: u32,
    pub failed: u32,
    pub elapsed: Duration,
}

impl TestReport {
    pub fn record(&mut self, status: SessionStatus) {
        self.sessions += 1;
        match status {
            SessionStatus::CompletedBySentinel => self.completed_by_sentinel += 1,
            SessionStatus::CompletedByStreamEnd => self.completed_by_stream_end += 1,
            // A runner only ever hands back terminal events
            SessionStatus::Failed | SessionStatus::Running => self.failed += 1,
        }
    }
}
