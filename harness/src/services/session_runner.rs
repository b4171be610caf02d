//! Session runner
//!
//! Drives one streamed request to a terminal state. Each decoded chunk is
//! appended, classified, and reported; a sentinel ends the session at once and
//! drops the response, which releases the connection without draining it.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderName, HeaderValue};
use shared::{Component, harness_debug, harness_info, harness_warn};

use crate::core::{SessionState, Utf8ChunkDecoder};
use crate::error::{HarnessError, HarnessResult, SessionError};
use crate::traits::EventPublisher;
use crate::types::{ProgressEvent, RequestBody, TestRequest};

/// Runs sessions against the target; cheap to clone per session
pub struct SessionRunner<P: EventPublisher> {
    client: reqwest::Client,
    publisher: Arc<P>,
    timeout: Duration,
}

impl<P: EventPublisher> Clone for SessionRunner<P> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            publisher: Arc::clone(&self.publisher),
            timeout: self.timeout,
        }
    }
}

impl<P: EventPublisher> SessionRunner<P> {
    /// Build a runner with its own connection pool
    pub fn new(publisher: Arc<P>, timeout: Duration) -> HarnessResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HarnessError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, publisher, timeout))
    }

    pub fn with_client(client: reqwest::Client, publisher: Arc<P>, timeout: Duration) -> Self {
        Self { client, publisher, timeout }
    }

    pub fn publisher(&self) -> &Arc<P> {
        &self.publisher
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run session `session_index` to completion and return its terminal event
    ///
    /// Never fails: timeouts and transport errors become a `Failed` event.
    /// The terminal event is published before it is returned.
    pub async fn run(&self, request: &TestRequest, session_index: u32) -> ProgressEvent {
        let mut state = SessionState::new(session_index);
        harness_debug!(
            Component::Runner,
            "Session {} → {} {}",
            session_index,
            request.method,
            request.endpoint
        );

        let outcome = tokio::time::timeout(self.timeout, self.stream_session(request, &mut state)).await;

        let terminal = match outcome {
            Ok(Ok(event)) => event,
            Ok(Err(error)) => {
                harness_warn!(Component::Runner, "Session {} failed: {}", session_index, error);
                state.fail(&error)
            }
            Err(_) => {
                harness_warn!(
                    Component::Runner,
                    "Session {} timed out after {:?} ({} chunks)",
                    session_index,
                    self.timeout,
                    state.chunk_count()
                );
                state.fail(&SessionError::Timeout)
            }
        };

        harness_info!(
            Component::Runner,
            "Session {} finished: {:?} after {} chunks",
            session_index,
            terminal.status,
            terminal.chunk_count
        );

        self.publisher.publish(request.subscriber.clone(), terminal.clone()).await;
        terminal
    }

    async fn stream_session(
        &self,
        request: &TestRequest,
        state: &mut SessionState,
    ) -> Result<ProgressEvent, SessionError> {
        let response = self
            .build_request(request)?
            .send()
            .await
            .map_err(SessionError::from_transport)?;

        // Error statuses still stream a body worth reporting
        harness_debug!(
            Component::Runner,
            "Session {} response status {}",
            state.session_index(),
            response.status()
        );

        let chunks = response
            .bytes_stream()
            .map(|item| item.map_err(SessionError::from_transport));
        self.consume(chunks, request, state).await
    }

    fn build_request(&self, request: &TestRequest) -> Result<reqwest::RequestBuilder, SessionError> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.endpoint.as_str());

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SessionError::Request(format!("invalid header name {name:?}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| SessionError::Request(format!("invalid value for header {name:?}: {e}")))?;
            builder = builder.header(header_name, header_value);
        }

        if request.method.carries_body() {
            builder = match &request.body {
                Some(RequestBody::Json(value)) => builder.json(value),
                Some(RequestBody::Raw(text)) => builder.body(text.clone()),
                None => builder,
            };
        }

        Ok(builder)
    }

    /// Read `chunks` until a sentinel, the end of the stream, or an error
    ///
    /// Intermediate events are published here; the terminal event is
    /// returned for `run` to publish.
    pub(crate) async fn consume<S, B>(
        &self,
        chunks: S,
        request: &TestRequest,
        state: &mut SessionState,
    ) -> Result<ProgressEvent, SessionError>
    where
        S: Stream<Item = Result<B, SessionError>>,
        B: AsRef<[u8]>,
    {
        futures_util::pin_mut!(chunks);
        let mut decoder = Utf8ChunkDecoder::new();

        while let Some(item) = chunks.next().await {
            let text = decoder.decode(item?.as_ref());
            if let Some(terminal) = self.accept(&text, request, state).await {
                if let Some(sentinel) = request.sentinels.first_match(&text) {
                    harness_debug!(
                        Component::Runner,
                        "Session {} matched sentinel {:?}",
                        state.session_index(),
                        sentinel
                    );
                }
                return Ok(terminal);
            }
        }

        let tail = decoder.finish();
        if let Some(terminal) = self.accept(&tail, request, state).await {
            return Ok(terminal);
        }

        Ok(state.finish_stream())
    }

    /// Apply one chunk; publishes progress and returns a terminal event if reached
    async fn accept(&self, text: &str, request: &TestRequest, state: &mut SessionState) -> Option<ProgressEvent> {
        match state.accept_chunk(text, &request.sentinels) {
            Some(event) if event.is_terminal() => Some(event),
            Some(event) => {
                self.publisher.publish(request.subscriber.clone(), event).await;
                None
            }
            None => None,
        }
    }
}
