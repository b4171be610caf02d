//! Shared types for the streaming load-test harness
//!
//! Contains the wire messages exchanged with browser clients, the identity
//! types those messages carry, and the logging setup used by every binary.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;

pub use types::*;
pub use errors::*;

// Re-exported so the logging macros resolve without a direct tracing dependency
pub use tracing;

pub use messages::{
    // Browser → harness trigger
    StartTestRequest, StartTestResponse,

    // Harness → browser push channel
    ServerMessage,

    // Defaults applied to trigger fields
    default_end_flags, DEFAULT_END_FLAGS,
};
