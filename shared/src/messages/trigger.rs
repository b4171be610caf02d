//! Start-test trigger messages
//!
//! Wire form of the `POST /api/start-test` body. Every field has a default so
//! a bare `{}` is a valid (if not very useful) request; validation into the
//! harness's domain types happens on the harness side.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::SubscriberId;

/// Completion markers used when a request carries no `end_flags`
///
/// Matched as plain substrings of a chunk, never parsed as JSON.
pub const DEFAULT_END_FLAGS: [&str; 3] = [
    r#""type": "end""#,
    r#""streaming_completed": true"#,
    r#""type": "complete""#,
];

pub fn default_end_flags() -> Vec<String> {
    DEFAULT_END_FLAGS.iter().map(|flag| flag.to_string()).collect()
}

fn default_concurrency() -> i64 {
    1
}

fn default_endpoint() -> String {
    "/".to_string()
}

fn default_method() -> String {
    "GET".to_string()
}

/// Body of `POST /api/start-test`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StartTestRequest {
    /// Number of simultaneous sessions; signed so out-of-range input reaches validation
    #[serde(default = "default_concurrency", deserialize_with = "deserialize_concurrency")]
    pub concurrency: i64,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub body: Option<Value>,

    /// Subscriber that receives progress; events are dropped when absent
    #[serde(default, deserialize_with = "deserialize_ws_id", skip_serializing_if = "Option::is_none")]
    pub ws_id: Option<SubscriberId>,

    #[serde(default = "default_end_flags")]
    pub end_flags: Vec<String>,
}

impl Default for StartTestRequest {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            endpoint: default_endpoint(),
            method: default_method(),
            headers: HashMap::new(),
            body: None,
            ws_id: None,
            end_flags: default_end_flags(),
        }
    }
}

/// Accepts `3` as well as `"3"`
fn deserialize_concurrency<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(number) => Ok(number),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Blank or malformed ids collapse to "no subscriber" rather than rejecting the test
fn deserialize_ws_id<'de, D>(deserializer: D) -> Result<Option<SubscriberId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(text)) => text.parse().ok(),
        Some(Value::Number(number)) => number.to_string().parse().ok(),
        _ => None,
    })
}

/// Response to `POST /api/start-test`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StartTestResponse {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StartTestResponse {
    pub fn started() -> Self {
        Self { status: "started".to_string(), message: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: "error".to_string(), message: Some(message.into()) }
    }
}
