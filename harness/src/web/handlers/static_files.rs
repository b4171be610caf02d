//! Frontend page handler

use axum::{extract::State, response::Html};
use shared::{Component, harness_debug};

use crate::server::HarnessServer;
use crate::traits::{EventPublisher, SubscriberRegistry};

const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Streaming Load Test</title>
</head>
<body>
    <h1>Streaming Load Test Harness</h1>
    <p>No frontend build found. Open a WebSocket on <code>/ws</code> and POST to <code>/api/start-test</code>.</p>
</body>
</html>
"#;

/// Serve index.html for the root path, falling back to a minimal page
pub async fn serve_index<R, P>(State(server): State<HarnessServer<R, P>>) -> Html<String>
where
    R: SubscriberRegistry + 'static,
    P: EventPublisher + 'static,
{
    let index_path = server.state().config.frontend_dir.join("index.html");

    match tokio::fs::read_to_string(&index_path).await {
        Ok(content) => Html(content),
        Err(e) => {
            harness_debug!(Component::Server, "No frontend at {}: {}", index_path.display(), e);
            Html(FALLBACK_INDEX.to_string())
        }
    }
}
