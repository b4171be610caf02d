//! Subscriber registry service implementation
//!
//! Maps subscriber identities to the outbound queue of their WebSocket.
//! Entries are inserted when a connection is accepted and removed when it
//! ends; nothing else mutates the map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Component, SubscriberId, harness_debug, harness_info, harness_warn};
use tokio::sync::RwLock;

use crate::error::{HarnessError, HarnessResult};
use crate::traits::{SubscriberRegistry, SubscriberSender};

/// Subscriber channel owned by its registry entry
#[derive(Debug)]
struct SubscriberChannel {
    sender: SubscriberSender,
    connected_at: DateTime<Utc>,
}

/// Real subscriber registry implementation
#[derive(Clone, Default)]
pub struct RealSubscriberRegistry {
    subscribers: Arc<RwLock<HashMap<SubscriberId, SubscriberChannel>>>,
}

impl RealSubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// When a live subscriber connected
    pub async fn connected_at(&self, subscriber_id: &SubscriberId) -> Option<DateTime<Utc>> {
        let subscribers = self.subscribers.read().await;
        subscribers.get(subscriber_id).map(|channel| channel.connected_at)
    }
}

#[async_trait]
impl SubscriberRegistry for RealSubscriberRegistry {
    async fn register(&self, subscriber_id: SubscriberId, sender: SubscriberSender) -> HarnessResult<()> {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.contains_key(&subscriber_id) {
            harness_warn!(Component::Registry, "Subscriber {} already registered", subscriber_id);
            return Err(HarnessError::websocket(format!("subscriber {} already registered", subscriber_id)));
        }

        subscribers.insert(
            subscriber_id.clone(),
            SubscriberChannel { sender, connected_at: Utc::now() },
        );
        harness_info!(
            Component::Registry,
            "👋 Registered subscriber {} ({} live)",
            subscriber_id,
            subscribers.len()
        );
        Ok(())
    }

    async fn unregister(&self, subscriber_id: &SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write().await;
        match subscribers.remove(subscriber_id) {
            Some(_) => {
                harness_info!(
                    Component::Registry,
                    "👋 Removed subscriber {} ({} live)",
                    subscriber_id,
                    subscribers.len()
                );
                true
            }
            None => {
                harness_debug!(Component::Registry, "Subscriber {} was not registered", subscriber_id);
                false
            }
        }
    }

    async fn lookup(&self, subscriber_id: &SubscriberId) -> Option<SubscriberSender> {
        // Clone the sender so no lock is held while the caller delivers
        let subscribers = self.subscribers.read().await;
        subscribers.get(subscriber_id).map(|channel| channel.sender.clone())
    }

    async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    async fn active_subscribers(&self) -> Vec<SubscriberId> {
        self.subscribers.read().await.keys().cloned().collect()
    }
}
