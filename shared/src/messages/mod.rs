//! Message types exchanged between browser clients and the harness
//!
//! - `trigger`: the start-test request/response pair (HTTP)
//! - `subscriber`: frames pushed to a subscriber over its WebSocket

pub mod trigger;
pub mod subscriber;

pub use trigger::{StartTestRequest, StartTestResponse, default_end_flags, DEFAULT_END_FLAGS};

pub use subscriber::ServerMessage;
