//! End-to-end streaming tests
//!
//! A real target streams chunks over HTTP while a WebSocket subscriber
//! watches the progress frames the harness pushes.

mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use helpers::*;

#[tokio::test]
async fn test_two_sessions_complete_on_sentinel() {
    let (target, target_state) = spawn_target().await;
    let (harness, _server) = spawn_harness(target).await;
    let (mut subscriber, ws_id) = connect_subscriber(harness).await;

    let (status, body) = start_test(
        harness,
        json!({
            "concurrency": 2,
            "endpoint": "/echo",
            "method": "POST",
            "body": {"q": "hi"},
            "ws_id": ws_id,
            "end_flags": ["DONE"],
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({"status": "started"}));

    let frames = collect_sessions(&mut subscriber, 2).await;
    for session in [1, 2] {
        assert_eq!(
            frames[&session],
            vec![
                "🔄 [진행중 - 1개 청크] partial ".to_string(),
                "✅ [완료] partial DONE".to_string(),
            ],
            "session {session}"
        );
    }

    let bodies = target_state.echo_bodies.lock().unwrap().clone();
    assert_eq!(bodies, vec![json!({"q": "hi"}), json!({"q": "hi"})]);
}

#[tokio::test]
async fn test_sentinel_releases_endless_stream() {
    let (target, target_state) = spawn_target().await;
    let (harness, _server) = spawn_harness(target).await;
    let (mut subscriber, ws_id) = connect_subscriber(harness).await;

    let (status, _) = tokio::time::timeout(
        Duration::from_secs(5),
        start_test(harness, json!({"endpoint": "/forever", "ws_id": ws_id, "end_flags": ["DONE"]})),
    )
    .await
    .expect("test must finish although the target never closes");
    assert_eq!(status, 200);

    let frames = collect_sessions(&mut subscriber, 1).await;
    assert_eq!(frames[&1], vec!["✅ [완료] answer DONE".to_string()]);

    let dropped = Arc::clone(&target_state.bodies_dropped);
    let released = wait_for_condition(
        move || {
            let dropped = Arc::clone(&dropped);
            async move { dropped.load(Ordering::SeqCst) == 1 }
        },
        2000,
    )
    .await;
    assert!(released, "target body should be dropped once the harness stops reading");
}

#[tokio::test]
async fn test_stream_end_without_sentinel() {
    let (target, _) = spawn_target().await;
    let (harness, _server) = spawn_harness(target).await;
    let (mut subscriber, ws_id) = connect_subscriber(harness).await;

    let (status, _) = start_test(harness, json!({"endpoint": "/plain", "ws_id": ws_id})).await;
    assert_eq!(status, 200);

    let frames = collect_sessions(&mut subscriber, 1).await;
    assert_eq!(
        frames[&1],
        vec![
            "🔄 [진행중 - 1개 청크] a".to_string(),
            "🔄 [진행중 - 2개 청크] ab".to_string(),
            "⚠️ [연결 종료] ab".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_session_does_not_affect_siblings() {
    let (target, _) = spawn_target().await;
    let (harness, server) = spawn_harness(target).await;
    let (mut subscriber, ws_id) = connect_subscriber(harness).await;

    let (status, _) = start_test(
        harness,
        json!({"concurrency": 3, "endpoint": "/flaky", "ws_id": ws_id, "end_flags": ["DONE"]}),
    )
    .await;
    assert_eq!(status, 200);

    let frames = collect_sessions(&mut subscriber, 3).await;
    let terminals: Vec<&String> = frames.values().filter_map(|responses| responses.last()).collect();

    assert_eq!(terminals.iter().filter(|text| text.starts_with("ERROR:")).count(), 1);
    assert_eq!(
        terminals.iter().filter(|text| text.as_str() == "✅ [완료] partial DONE").count(),
        2
    );

    let report = server.state().last_report.read().await.clone().unwrap();
    assert_eq!(report.sessions, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.completed_by_sentinel, 2);
}

#[tokio::test]
async fn test_default_sentinels_apply_when_omitted() {
    let (target, _) = spawn_target().await;
    let (harness, _server) = spawn_harness(target).await;
    let (mut subscriber, ws_id) = connect_subscriber(harness).await;

    // "DONE" is not a default sentinel, so the stream runs to its end
    let (status, _) = start_test(
        harness,
        json!({"endpoint": "/echo", "method": "POST", "body": {"q": 1}, "ws_id": ws_id}),
    )
    .await;
    assert_eq!(status, 200);

    let frames = collect_sessions(&mut subscriber, 1).await;
    assert_eq!(frames[&1].last().unwrap(), "⚠️ [연결 종료] partial DONE");
}
