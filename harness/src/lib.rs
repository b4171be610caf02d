//! Concurrent HTTP streaming load-test harness
//!
//! Fires N simultaneous requests at a streaming endpoint, classifies each
//! chunk against completion sentinels, and pushes per-session progress to a
//! browser over WebSocket.

pub mod config;
pub mod core;
pub mod error;
pub mod server;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;
pub mod web;

// Re-export main types
pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult, SessionError};
pub use server::{DefaultHarnessServer, HarnessServer};
pub use state::HarnessState;
pub use types::*;

// Re-export trait definitions
pub use traits::{EventPublisher, SubscriberRegistry, SubscriberSender};

// Re-export service implementations
pub use services::{RealEventPublisher, RealSubscriberRegistry, SessionRunner, TestOrchestrator};
