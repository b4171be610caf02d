//! REST API handlers
//!
//! The start-test trigger plus read-only status endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use shared::{Component, StartTestRequest, StartTestResponse, harness_info, harness_warn};

use crate::error::{HarnessError, HarnessResult};
use crate::server::HarnessServer;
use crate::traits::{EventPublisher, SubscriberRegistry};
use crate::types::TestRequest;

/// Start a load test - /api/start-test
///
/// Responds only after every session of the test has reached a terminal state.
pub async fn start_test<R, P>(
    State(server): State<HarnessServer<R, P>>,
    payload: Result<Json<StartTestRequest>, JsonRejection>,
) -> HarnessResult<Json<StartTestResponse>>
where
    R: SubscriberRegistry + 'static,
    P: EventPublisher + 'static,
{
    let Json(raw) = payload.map_err(|rejection| {
        harness_warn!(Component::Server, "Rejected start-test body: {}", rejection.body_text());
        HarnessError::invalid_request(rejection.body_text())
    })?;

    let request = TestRequest::from_wire(raw, &server.state().config)?;

    harness_info!(
        Component::Server,
        "📥 start-test: {} x {} {} (subscriber: {})",
        request.concurrency,
        request.method,
        request.endpoint,
        request
            .subscriber
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    server.orchestrator().start_test(request).await;

    Ok(Json(StartTestResponse::started()))
}

/// Get harness status - /api/status
pub async fn status<R, P>(State(server): State<HarnessServer<R, P>>) -> Json<Value>
where
    R: SubscriberRegistry + 'static,
    P: EventPublisher + 'static,
{
    let state = server.state();
    let subscribers = server.registry().subscriber_count().await;

    let last_report = state.last_report.read().await.as_ref().map(|report| {
        json!({
            "sessions": report.sessions,
            "completed_by_sentinel": report.completed_by_sentinel,
            "completed_by_stream_end": report.completed_by_stream_end,
            "failed": report.failed,
            "elapsed_ms": report.elapsed.as_millis() as u64,
        })
    });

    Json(json!({
        "status": "ok",
        "data": {
            "server_status": if state.is_running() { "running" } else { "stopping" },
            "connected_subscribers": subscribers,
            "open_connections": state.get_connection_count(),
            "tests_started": state.tests_started.load(std::sync::atomic::Ordering::Relaxed),
            "tests_finished": state.tests_finished.load(std::sync::atomic::Ordering::Relaxed),
            "active_sessions": state.get_active_sessions(),
            "last_report": last_report,
            "uptime_seconds": state.get_uptime_seconds(),
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
}

/// Health check - /health
pub async fn health_check<R, P>(State(server): State<HarnessServer<R, P>>) -> Json<Value>
where
    R: SubscriberRegistry + 'static,
    P: EventPublisher + 'static,
{
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "uptime_seconds": server.state().get_uptime_seconds(),
    }))
}
