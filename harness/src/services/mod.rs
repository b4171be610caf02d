//! Service implementations
//!
//! Real implementations of the service traits plus the runner and
//! orchestrator that drive a test.

pub mod subscriber_registry;
pub mod event_publisher;
pub mod session_runner;
pub mod orchestrator;

#[cfg(test)]
mod tests;

// Re-export service implementations
pub use subscriber_registry::RealSubscriberRegistry;
pub use event_publisher::RealEventPublisher;
pub use session_runner::SessionRunner;
pub use orchestrator::TestOrchestrator;
