//! Test helpers for harness service tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shared::{ServerMessage, SubscriberId};
use tokio::sync::mpsc;

use crate::config::HarnessConfig;
use crate::services::{RealEventPublisher, RealSubscriberRegistry, SessionRunner};
use crate::state::HarnessState;
use crate::traits::{EventPublisher, SubscriberRegistry};
use crate::types::ProgressEvent;

use super::fixtures::{subscriber_channel, subscriber_id};

pub type WiredRunner = SessionRunner<RealEventPublisher<RealSubscriberRegistry>>;

/// Create a test harness state
pub fn create_test_state() -> Arc<HarnessState> {
    Arc::new(HarnessState::new(HarnessConfig::default()))
}

/// Runner backed by a real registry with one registered subscriber "watcher"
pub async fn wired_runner(timeout: Duration) -> (WiredRunner, SubscriberId, mpsc::UnboundedReceiver<ServerMessage>) {
    let registry = Arc::new(RealSubscriberRegistry::new());
    let (tx, rx) = subscriber_channel();
    let watcher = subscriber_id("watcher");
    registry.register(watcher.clone(), tx).await.unwrap();

    let publisher = Arc::new(RealEventPublisher::new(registry));
    let runner = SessionRunner::new(publisher, timeout).unwrap();
    (runner, watcher, rx)
}

/// Everything queued for a subscriber so far
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<(u32, String)> {
    let mut frames = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let ServerMessage::Progress { session, response } = message {
            frames.push((session, response));
        }
    }
    frames
}

/// Bind a socket that accepts connections and never answers
pub async fn silent_target() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}/stream")
}

/// Nothing listens on port 1, so connecting fails immediately
pub const REFUSED_TARGET: &str = "http://127.0.0.1:1/stream";

/// Publisher that records events and panics on one session's terminal event
#[derive(Default)]
pub struct PanickingPublisher {
    pub panic_on_session: u32,
    pub events: Mutex<Vec<ProgressEvent>>,
}

#[async_trait]
impl EventPublisher for PanickingPublisher {
    async fn publish(&self, _subscriber: Option<SubscriberId>, event: ProgressEvent) {
        let should_panic = event.session_index == self.panic_on_session
            && event.is_terminal()
            && !event.rendered_text.contains("session aborted");
        if should_panic {
            panic!("publisher blew up on session {}", event.session_index);
        }
        self.events.lock().unwrap().push(event);
    }
}

/// Test helper to wait for async operations
pub async fn wait_for_condition<F, Fut>(mut condition: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        if condition().await {
            return true;
        }

        if start.elapsed() > timeout {
            return false;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
