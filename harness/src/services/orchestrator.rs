//! Concurrency orchestrator
//!
//! Fans one test out into `concurrency` independent session tasks and waits
//! for every one of them. A session that fails, or whose task panics, is
//! reported on its own index and never touches its siblings.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use shared::{Component, harness_error, harness_info};
use tracing::Instrument;

use crate::error::SessionError;
use crate::services::session_runner::SessionRunner;
use crate::state::HarnessState;
use crate::traits::EventPublisher;
use crate::types::{ProgressEvent, SessionStatus, TestReport, TestRequest};

pub struct TestOrchestrator<P: EventPublisher> {
    runner: SessionRunner<P>,
    state: Arc<HarnessState>,
}

impl<P: EventPublisher> Clone for TestOrchestrator<P> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<P: EventPublisher + 'static> TestOrchestrator<P> {
    pub fn new(runner: SessionRunner<P>, state: Arc<HarnessState>) -> Self {
        Self { runner, state }
    }

    pub fn runner(&self) -> &SessionRunner<P> {
        &self.runner
    }

    /// Run every session of `request` and return once all are terminal
    pub async fn start_test(&self, request: TestRequest) -> TestReport {
        let started = Instant::now();
        let test_number = self.state.test_started();
        let request = Arc::new(request);

        harness_info!(
            Component::Orchestrator,
            "🚀 Test #{}: {} sessions → {} {}",
            test_number,
            request.concurrency,
            request.method,
            request.endpoint
        );

        let handles: Vec<_> = (1..=request.concurrency)
            .map(|session_index| {
                let runner = self.runner.clone();
                let request = Arc::clone(&request);
                let state = Arc::clone(&self.state);
                let span = tracing::info_span!("session", test = test_number, index = session_index);

                let handle = tokio::spawn(
                    async move {
                        let _active = state.enter_session();
                        runner.run(&request, session_index).await
                    }
                    .instrument(span),
                );
                (session_index, handle)
            })
            .collect();

        let outcomes = join_all(
            handles
                .into_iter()
                .map(|(session_index, handle)| async move { (session_index, handle.await) }),
        )
        .await;

        let mut report = TestReport::default();
        for (session_index, outcome) in outcomes {
            match outcome {
                Ok(event) => report.record(event.status),
                Err(join_error) => {
                    harness_error!(
                        Component::Orchestrator,
                        "Session {} task aborted: {}",
                        session_index,
                        join_error
                    );
                    self.report_aborted(&request, session_index, join_error.to_string()).await;
                    report.record(SessionStatus::Failed);
                }
            }
        }
        report.elapsed = started.elapsed();

        harness_info!(
            Component::Orchestrator,
            "✅ Test #{} finished in {:?}: {} by sentinel, {} by stream end, {} failed",
            test_number,
            report.elapsed,
            report.completed_by_sentinel,
            report.completed_by_stream_end,
            report.failed
        );

        self.state.test_finished(report.clone()).await;
        report
    }

    /// A panicked session never published its terminal event; send one for it
    async fn report_aborted(&self, request: &TestRequest, session_index: u32, reason: String) {
        let event = ProgressEvent {
            session_index,
            status: SessionStatus::Failed,
            rendered_text: crate::core::render::render_failure(&SessionError::Aborted(reason)),
            chunk_count: 0,
        };
        self.runner.publisher().publish(request.subscriber.clone(), event).await;
    }
}
