//! Test helper utilities for harness integration tests
//!
//! Spins up a streaming target and a harness on loopback ports, plus a
//! WebSocket subscriber that reads progress frames.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    routing::{get, post},
    Json, Router,
};
use futures_util::{stream, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

use harness::{DefaultHarnessServer, HarnessConfig};

pub type Subscriber = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Gap between chunks so each one reaches the harness on its own
const PACE: Duration = Duration::from_millis(80);

/// Counters shared with the target's handlers
#[derive(Clone, Default)]
pub struct TargetState {
    pub flaky_hits: Arc<AtomicU32>,
    pub bodies_dropped: Arc<AtomicU32>,
    pub echo_bodies: Arc<std::sync::Mutex<Vec<Value>>>,
}

/// Releases a count when the response body it is attached to is dropped
struct DropSignal(Arc<AtomicU32>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn paced(parts: Vec<Result<&'static str, std::io::Error>>) -> impl futures_util::Stream<Item = Result<Bytes, std::io::Error>> + Send {
    stream::iter(parts).then(|part| async move {
        tokio::time::sleep(PACE).await;
        part.map(|text| Bytes::from_static(text.as_bytes()))
    })
}

/// POST /echo: "partial " then "DONE", recording the JSON body it received
async fn echo(State(target): State<TargetState>, Json(body): Json<Value>) -> Body {
    if let Ok(mut bodies) = target.echo_bodies.lock() {
        bodies.push(body);
    }
    Body::from_stream(paced(vec![Ok("partial "), Ok("DONE")]))
}

/// GET /forever: sentinel chunk, then the body never ends
async fn forever(State(target): State<TargetState>) -> Body {
    let signal = DropSignal(Arc::clone(&target.bodies_dropped));
    let body = paced(vec![Ok("answer DONE")])
        .chain(stream::pending())
        .map(move |item| {
            let _held = &signal;
            item
        });
    Body::from_stream(body)
}

/// GET /plain: two chunks and a clean close, no sentinel
async fn plain() -> Body {
    Body::from_stream(paced(vec![Ok("a"), Ok("b")]))
}

/// GET /flaky: the first caller's body breaks after one chunk
async fn flaky(State(target): State<TargetState>) -> Body {
    let first = target.flaky_hits.fetch_add(1, Ordering::SeqCst) == 0;
    let second = if first {
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "target failure"))
    } else {
        Ok("DONE")
    };
    Body::from_stream(paced(vec![Ok("partial "), second]))
}

/// Streaming target on a loopback port
pub async fn spawn_target() -> (SocketAddr, TargetState) {
    let state = TargetState::default();
    let router = Router::new()
        .route("/echo", post(echo))
        .route("/forever", get(forever))
        .route("/plain", get(plain))
        .route("/flaky", get(flaky))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, state)
}

/// Config resolving relative endpoints against `target`
pub fn target_config(target: SocketAddr) -> HarnessConfig {
    HarnessConfig::default()
        .with_target_base_url(Url::parse(&format!("http://{target}")).unwrap())
        .with_session_timeout(Duration::from_secs(10))
        .with_frontend_dir("./no-frontend-build")
}

/// Harness resolving relative endpoints against `target`
pub async fn spawn_harness(target: SocketAddr) -> (SocketAddr, DefaultHarnessServer) {
    spawn_harness_with_config(target_config(target)).await
}

pub async fn spawn_harness_with_config(config: HarnessConfig) -> (SocketAddr, DefaultHarnessServer) {
    let server = DefaultHarnessServer::from_config(config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.clone().serve(listener, std::future::pending()));
    (addr, server)
}

/// Open a subscriber and return it with the identity from its welcome frame
pub async fn connect_subscriber(harness: SocketAddr) -> (Subscriber, String) {
    let (mut socket, _) = connect_async(format!("ws://{harness}/ws")).await.unwrap();
    let welcome = next_json(&mut socket).await;
    let ws_id = welcome["ws_id"].as_str().expect("welcome carries ws_id").to_string();
    (socket, ws_id)
}

/// Next text frame as JSON
pub async fn next_json(socket: &mut Subscriber) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("frame within 5s")
            .expect("socket open")
            .expect("frame readable");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

pub fn is_terminal(response: &str) -> bool {
    response.starts_with("✅") || response.starts_with("⚠️") || response.starts_with("ERROR:")
}

/// Read progress frames until every session 1..=sessions has a terminal one
pub async fn collect_sessions(socket: &mut Subscriber, sessions: u32) -> BTreeMap<u32, Vec<String>> {
    let mut frames: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    loop {
        let done = (1..=sessions).all(|session| {
            frames
                .get(&session)
                .and_then(|responses| responses.last())
                .map(|last| is_terminal(last))
                .unwrap_or(false)
        });
        if done {
            return frames;
        }

        let frame = next_json(socket).await;
        let session = frame["session"].as_u64().expect("progress frame has session") as u32;
        let response = frame["response"].as_str().expect("progress frame has response").to_string();
        frames.entry(session).or_default().push(response);
    }
}

/// POST /api/start-test and return status plus JSON body
pub async fn start_test(harness: SocketAddr, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{harness}/api/start-test"))
        .json(&body)
        .timeout(Duration::from_secs(20))
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
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
