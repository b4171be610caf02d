//! Event publisher service implementation
//!
//! Looks the subscriber up on every delivery and never holds a channel
//! between events. A missing or closed subscriber is not an error.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{Component, SubscriberId, harness_debug};

use crate::traits::{EventPublisher, SubscriberRegistry};
use crate::types::ProgressEvent;

/// Real event publisher backed by a subscriber registry
pub struct RealEventPublisher<R: SubscriberRegistry> {
    registry: Arc<R>,
}

impl<R: SubscriberRegistry> RealEventPublisher<R> {
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }
}

impl<R: SubscriberRegistry> Clone for RealEventPublisher<R> {
    fn clone(&self) -> Self {
        Self { registry: Arc::clone(&self.registry) }
    }
}

#[async_trait]
impl<R: SubscriberRegistry> EventPublisher for RealEventPublisher<R> {
    async fn publish(&self, subscriber: Option<SubscriberId>, event: ProgressEvent) {
        let Some(subscriber_id) = subscriber else {
            harness_debug!(
                Component::Publisher,
                "No subscriber for session {}, dropping event",
                event.session_index
            );
            return;
        };

        let Some(sender) = self.registry.lookup(&subscriber_id).await else {
            harness_debug!(
                Component::Publisher,
                "Subscriber {} not connected, dropping event for session {}",
                subscriber_id,
                event.session_index
            );
            return;
        };

        // Unbounded queue: never waits on the browser
        if sender.send(event.to_server_message()).is_err() {
            harness_debug!(
                Component::Publisher,
                "Subscriber {} closed, dropping event for session {}",
                subscriber_id,
                event.session_index
            );
        }
    }
}
