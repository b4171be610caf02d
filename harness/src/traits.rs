//! Service trait definitions for dependency injection
//!
//! The registry and publisher sit behind traits so the runner and
//! orchestrator can be exercised without real WebSocket connections.

use async_trait::async_trait;
use tokio::sync::mpsc;

use shared::{ServerMessage, SubscriberId};
use crate::error::HarnessResult;
use crate::types::ProgressEvent;

/// Outbound queue feeding one subscriber's WebSocket writer
pub type SubscriberSender = mpsc::UnboundedSender<ServerMessage>;

/// Process-wide map of live subscriber channels
#[mockall::automock]
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// Register a freshly accepted subscriber
    async fn register(&self, subscriber_id: SubscriberId, sender: SubscriberSender) -> HarnessResult<()>;

    /// Remove a subscriber; returns whether it was present
    async fn unregister(&self, subscriber_id: &SubscriberId) -> bool;

    /// Sender for a live subscriber, if any
    async fn lookup(&self, subscriber_id: &SubscriberId) -> Option<SubscriberSender>;

    /// Number of live subscribers
    async fn subscriber_count(&self) -> usize;

    /// Identities of live subscribers
    async fn active_subscribers(&self) -> Vec<SubscriberId>;
}

/// Routes session events to whoever is watching the test
#[mockall::automock]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver `event` to `subscriber`; absent or closed subscribers are a no-op
    async fn publish(&self, subscriber: Option<SubscriberId>, event: ProgressEvent);
}
