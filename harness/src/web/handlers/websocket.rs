//! WebSocket subscriber handler
//!
//! Each accepted socket gets a fresh identity, announced in its first frame,
//! and a single writer task draining the subscriber's queue.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use shared::{Component, ServerMessage, SubscriberId, harness_debug, harness_error, harness_info, harness_warn};
use tokio::sync::mpsc;

use crate::server::HarnessServer;
use crate::traits::{EventPublisher, SubscriberRegistry};

/// WebSocket upgrade handler - /ws
pub async fn websocket_handler<R, P>(
    ws: WebSocketUpgrade,
    State(server): State<HarnessServer<R, P>>,
) -> Response
where
    R: SubscriberRegistry + 'static,
    P: EventPublisher + 'static,
{
    ws.on_upgrade(move |socket| handle_subscriber(socket, server))
}

async fn handle_subscriber<R, P>(socket: WebSocket, server: HarnessServer<R, P>)
where
    R: SubscriberRegistry + 'static,
    P: EventPublisher + 'static,
{
    let subscriber_id = SubscriberId::new();
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Queued before registration so the welcome frame is always first
    if tx.send(ServerMessage::Welcome { ws_id: subscriber_id.clone() }).is_err() {
        return;
    }

    if let Err(e) = server.registry().register(subscriber_id.clone(), tx).await {
        harness_error!(Component::Server, "Failed to register subscriber {}: {}", subscriber_id, e);
        return;
    }
    let open = server.state().increment_connection_count();
    harness_info!(Component::Server, "🔗 Subscriber connected: {} ({} open)", subscriber_id, open);

    let writer_id = subscriber_id.clone();
    let mut outgoing_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    harness_error!(Component::Server, "Failed to serialize frame for {}: {}", writer_id, e);
                    continue;
                }
            };

            if let Err(e) = sink.send(Message::Text(text)).await {
                harness_debug!(Component::Server, "Send to {} failed: {}", writer_id, e);
                break;
            }
        }
    });

    // Inbound frames carry no meaning; only watch for the socket going away
    let reader_id = subscriber_id.clone();
    let mut incoming_task = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Close(_)) => break,
                Ok(_) => {
                    harness_debug!(Component::Server, "Ignoring inbound frame from {}", reader_id);
                }
                Err(e) => {
                    harness_warn!(Component::Server, "WebSocket error for {}: {}", reader_id, e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut outgoing_task => incoming_task.abort(),
        _ = &mut incoming_task => outgoing_task.abort(),
    }

    server.registry().unregister(&subscriber_id).await;
    let open = server.state().decrement_connection_count();
    harness_info!(Component::Server, "👋 Subscriber disconnected: {} ({} open)", subscriber_id, open);
}
