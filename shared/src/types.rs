//! Core types used throughout the harness

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SharedError;

/// Harness component emitting a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    /// HTTP / WebSocket front door
    Server,
    /// Fan-out of sessions for one test
    Orchestrator,
    /// A single streamed session
    Runner,
    /// Subscriber channel bookkeeping
    Registry,
    /// Event routing to subscribers
    Publisher,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Server => write!(f, "server"),
            Component::Orchestrator => write!(f, "orchestrator"),
            Component::Runner => write!(f, "runner"),
            Component::Registry => write!(f, "registry"),
            Component::Publisher => write!(f, "publisher"),
        }
    }
}

/// Opaque identity of a live subscriber connection
///
/// Minted when a WebSocket is accepted and echoed back by the browser in the
/// `ws_id` field of a start-test request. Numeric ids are accepted on input
/// and compared by their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriberId(String);

impl SubscriberId {
    /// Mint a fresh random identity
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubscriberId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SharedError::InvalidSubscriberId { input: s.to_string() });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for SubscriberId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Number(number) => Ok(Self(number.to_string())),
        }
    }
}
